//! Fuel report records

use super::record::{EntityType, FormField, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statuses a fuel report moves through
pub const FUEL_REPORT_STATUSES: &[&str] = &["draft", "pending", "approved", "rejected"];

/// Location a fuel report was filed at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelReport {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub internal_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub place: Place,
    #[serde(default = "default_status")]
    pub status: String,
    /// Litres dispensed
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "draft".to_string()
}

impl Default for FuelReport {
    fn default() -> Self {
        Self {
            id: None,
            public_id: None,
            internal_id: None,
            name: String::new(),
            email: None,
            phone: None,
            country: None,
            place: Place::default(),
            status: default_status(),
            volume: None,
            amount: None,
            currency: None,
            created_by: None,
            updated_by: None,
            created_at: None,
            updated_at: None,
        }
    }
}

const FORM_FIELDS: &[FormField] = &[
    FormField::text("Name", "name").required(),
    FormField::text("Internal ID", "internal_id"),
    FormField::text("Email", "email"),
    FormField::text("Phone", "phone"),
    FormField::text("Country", "country"),
    FormField::text("Address", "place.address"),
    FormField::choice("Status", "status", FUEL_REPORT_STATUSES),
    FormField::number("Volume (L)", "volume"),
    FormField::number("Amount", "amount"),
    FormField::text("Currency", "currency"),
];

impl Record for FuelReport {
    const ENTITY: EntityType = EntityType::FuelReport;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn assign_identity(&mut self, id: String, public_id: String) {
        self.id = Some(id);
        self.public_id = Some(public_id);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    fn param_path(param: &str) -> &str {
        match param {
            "address" => "place.address",
            other => other,
        }
    }

    fn form_fields() -> &'static [FormField] {
        FORM_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::with_field_value;

    #[test]
    fn test_new_report_is_unsaved_draft() {
        let report = FuelReport::default();
        assert!(report.is_new());
        assert_eq!(report.status, "draft");
    }

    #[test]
    fn test_value_at_reads_nested_address() {
        let report = FuelReport {
            name: "Morning refuel".to_string(),
            place: Place {
                address: Some("12 Quay St".to_string()),
            },
            ..FuelReport::default()
        };
        assert_eq!(report.value_at("place.address"), Some("12 Quay St".to_string()));
        assert_eq!(report.value_at(FuelReport::param_path("address")), Some("12 Quay St".to_string()));
        assert_eq!(report.value_at("email"), None);
    }

    #[test]
    fn test_form_field_edits() {
        let report = FuelReport::default();
        let volume = FORM_FIELDS.iter().find(|f| f.path == "volume").unwrap();
        let status = FORM_FIELDS.iter().find(|f| f.path == "status").unwrap();

        let edited = with_field_value(&report, volume, "42.5").unwrap();
        assert_eq!(edited.volume, Some(42.5));

        assert!(with_field_value(&report, volume, "lots").is_err());
        assert!(with_field_value(&report, status, "archived").is_err());

        let cleared = with_field_value(&edited, volume, "  ").unwrap();
        assert_eq!(cleared.volume, None);
    }
}
