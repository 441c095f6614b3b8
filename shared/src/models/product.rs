//! Product Model

use serde::{Deserialize, Serialize};

use super::{Collection, Record, RecordId};
use crate::de::parse_number;
use crate::error::{ModelError, ModelResult};

/// Default category for new products
pub const DEFAULT_CATEGORY: &str = "Delivery";

/// Default product status
pub const DEFAULT_STATUS: &str = "Ativo";

/// Stock strictly below this is flagged as low
pub const LOW_STOCK_THRESHOLD: i64 = 10;

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

fn status_or_default<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(crate::de::optional_text(deserializer)?.unwrap_or_else(default_status))
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: RecordId,
    #[serde(rename = "nome", default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
    #[serde(rename = "categoria", default, deserialize_with = "crate::de::null_as_default")]
    pub category: String,
    /// Price in currency unit
    #[serde(rename = "preco", default, deserialize_with = "crate::de::amount")]
    pub price: f64,
    /// Cost in currency unit
    #[serde(rename = "custo", default, deserialize_with = "crate::de::amount")]
    pub cost: f64,
    #[serde(rename = "estoque", default, deserialize_with = "crate::de::count")]
    pub stock: i64,
    #[serde(default = "default_status", deserialize_with = "status_or_default")]
    pub status: String,
    #[serde(
        rename = "imageUrl",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub image_url: Option<String>,
    #[serde(
        rename = "descricao",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub description: Option<String>,
    /// Free-form label such as "2 dias"
    #[serde(
        rename = "tempoPreparo",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::de::optional_text"
    )]
    pub prep_time: Option<String>,
}

impl Product {
    /// Case-insensitive name search
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty() || self.name.to_lowercase().contains(&term)
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Create/update product payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "preco")]
    pub price: f64,
    #[serde(rename = "custo")]
    pub cost: f64,
    #[serde(rename = "estoque")]
    pub stock: i64,
    pub status: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "tempoPreparo", default)]
    pub prep_time: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: DEFAULT_CATEGORY.to_string(),
            price: 0.0,
            cost: 0.0,
            stock: 0,
            status: default_status(),
            description: String::new(),
            prep_time: String::new(),
            image_url: String::new(),
        }
    }
}

impl ProductDraft {
    /// Start editing an existing product
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            cost: product.cost,
            stock: product.stock,
            status: product.status.clone(),
            description: product.description.clone().unwrap_or_default(),
            prep_time: product.prep_time.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }

    /// Parse a form amount: empty means 0, anything else must be a non-negative number
    pub fn parse_amount(field: &'static str, raw: &str) -> ModelResult<f64> {
        if raw.trim().is_empty() {
            return Ok(0.0);
        }
        let value = parse_number(raw)
            .ok_or_else(|| ModelError::invalid(field, format!("not a number: {raw}")))?;
        if value < 0.0 {
            return Err(ModelError::invalid(field, "must be non-negative"));
        }
        Ok(value)
    }

    /// Parse a form stock count: empty means 0, fractions are truncated
    pub fn parse_stock(raw: &str) -> ModelResult<i64> {
        Self::parse_amount("estoque", raw).map(|v| v.trunc() as i64)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::invalid("nome", "required"));
        }
        if self.category.trim().is_empty() {
            return Err(ModelError::invalid("categoria", "required"));
        }
        for (field, value) in [("preco", self.price), ("custo", self.cost)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::invalid(field, "must be non-negative"));
            }
        }
        if self.stock < 0 {
            return Err(ModelError::invalid("estoque", "must be non-negative"));
        }
        Ok(())
    }

    pub fn to_payload(&self) -> ModelResult<serde_json::Value> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_defaults_and_search() {
        let product: Product = serde_json::from_str(
            r#"{"id": 1, "nome": "Bolo de Cenoura", "preco": "35.9", "estoque": null, "imageUrl": ""}"#,
        )
        .unwrap();
        assert_eq!(product.price, 35.9);
        assert_eq!(product.stock, 0);
        assert_eq!(product.status, "Ativo");
        assert!(product.image_url.is_none());
        assert!(product.matches("cenoura"));
        assert!(product.matches(""));
        assert!(!product.matches("brigadeiro"));
    }

    #[test]
    fn test_null_text_fields_fall_back() {
        let product: Product = serde_json::from_str(
            r#"{"id": "p", "nome": null, "categoria": null, "status": null}"#,
        )
        .unwrap();
        assert_eq!(product.name, "");
        assert_eq!(product.category, "");
        assert_eq!(product.status, DEFAULT_STATUS);
    }

    #[test]
    fn test_low_stock_below_ten() {
        let mut product: Product =
            serde_json::from_str(r#"{"id": "p", "nome": "Pão de mel", "estoque": "9"}"#).unwrap();
        assert!(product.is_low_stock());
        product.stock = LOW_STOCK_THRESHOLD;
        assert!(!product.is_low_stock());
        product.stock = -2;
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_form_amount_parsing() {
        assert_eq!(ProductDraft::parse_amount("preco", "").unwrap(), 0.0);
        assert_eq!(ProductDraft::parse_amount("preco", "12,90").unwrap(), 12.9);
        assert_eq!(ProductDraft::parse_stock("7.8").unwrap(), 7);
        assert!(ProductDraft::parse_amount("custo", "-1").is_err());
        assert!(ProductDraft::parse_amount("custo", "dez").is_err());
    }

    #[test]
    fn test_draft_requires_name() {
        let draft = ProductDraft::default();
        assert!(matches!(
            draft.to_payload(),
            Err(ModelError::InvalidField { field: "nome", .. })
        ));

        let draft = ProductDraft {
            name: "Brigadeiro".into(),
            price: 2.5,
            ..Default::default()
        };
        let payload = draft.to_payload().unwrap();
        assert_eq!(payload["categoria"], "Delivery");
        assert_eq!(payload["preco"], serde_json::json!(2.5));
    }
}
