//! Ordering client contact details

use serde::{Deserialize, Serialize};

/// Editable field of [`ClientInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientField {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Address,
    City,
    State,
    ZipCode,
}

/// Who is placing the order and where it ships
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ClientInfo {
    fn slot(&mut self, field: ClientField) -> &mut String {
        match field {
            ClientField::FirstName => &mut self.first_name,
            ClientField::LastName => &mut self.last_name,
            ClientField::Email => &mut self.email,
            ClientField::Phone => &mut self.phone,
            ClientField::Company => &mut self.company,
            ClientField::Address => &mut self.address,
            ClientField::City => &mut self.city,
            ClientField::State => &mut self.state,
            ClientField::ZipCode => &mut self.zip_code,
        }
    }

    /// Set a field, trimming surrounding whitespace
    pub fn set(&mut self, field: ClientField, value: impl Into<String>) {
        let value = value.into();
        *self.slot(field) = value.trim().to_string();
    }

    pub fn get(&self, field: ClientField) -> &str {
        match field {
            ClientField::FirstName => &self.first_name,
            ClientField::LastName => &self.last_name,
            ClientField::Email => &self.email,
            ClientField::Phone => &self.phone,
            ClientField::Company => &self.company,
            ClientField::Address => &self.address,
            ClientField::City => &self.city,
            ClientField::State => &self.state,
            ClientField::ZipCode => &self.zip_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_trims() {
        let mut client = ClientInfo::default();
        client.set(ClientField::ZipCode, "  94110 ");
        assert_eq!(client.get(ClientField::ZipCode), "94110");
        assert_eq!(client.zip_code, "94110");

        client.set(ClientField::ZipCode, "   ");
        assert_eq!(client.get(ClientField::ZipCode), "");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let client: ClientInfo =
            serde_json::from_str(r#"{"first_name":"Dana","company":"Bay Realty"}"#).unwrap();
        assert_eq!(client.first_name, "Dana");
        assert_eq!(client.company, "Bay Realty");
        assert!(client.email.is_empty());
    }
}
