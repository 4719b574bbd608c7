//! Checkout form data.
//!
//! Each form reports which required fields are still blank. Whitespace-only
//! values count as blank.

use serde::{Deserialize, Serialize};
use std::fmt;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn collect_missing(fields: &[(&'static str, &str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| blank(value))
        .map(|(name, _)| *name)
        .collect()
}

/// Customer identity (step 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdentityForm {
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Tax document number (CPF).
    pub document: String,
}

impl IdentityForm {
    /// Create a filled identity form.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        document: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            document: document.into(),
        }
    }

    /// Required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("phone", self.phone.as_str()),
            ("document", self.document.as_str()),
        ])
    }

    /// Check if every required field is filled.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Delivery address (step 2).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressForm {
    /// Postal code (CEP).
    pub zip: String,
    /// State code (e.g., "SP").
    pub state: String,
    /// City.
    pub city: String,
    /// Neighborhood.
    pub neighborhood: String,
    /// Street name.
    pub street: String,
    /// House or building number.
    pub number: String,
    /// Apartment, block, etc.
    pub complement: Option<String>,
}

impl AddressForm {
    /// Required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("zip", self.zip.as_str()),
            ("state", self.state.as_str()),
            ("city", self.city.as_str()),
            ("neighborhood", self.neighborhood.as_str()),
            ("street", self.street.as_str()),
            ("number", self.number.as_str()),
        ])
    }

    /// Check if every required field is filled.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut street = format!("{}, {}", self.street, self.number);
        if let Some(complement) = self.complement.as_deref().filter(|c| !blank(c)) {
            street.push_str(" - ");
            street.push_str(complement);
        }
        format!(
            "{street}, {}, {}/{}, {}",
            self.neighborhood, self.city, self.state, self.zip
        )
    }
}

/// Card details (step 3).
///
/// `Debug` never prints the card number or the security code.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentForm {
    /// Card number as typed.
    pub card_number: String,
    /// Name printed on the card.
    pub card_name: String,
    /// Expiry as typed (e.g., "12/30").
    pub card_expiry: String,
    /// Security code.
    pub card_cvv: String,
}

impl PaymentForm {
    /// Create a filled payment form.
    pub fn new(
        card_number: impl Into<String>,
        card_name: impl Into<String>,
        card_expiry: impl Into<String>,
        card_cvv: impl Into<String>,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            card_name: card_name.into(),
            card_expiry: card_expiry.into(),
            card_cvv: card_cvv.into(),
        }
    }

    /// Required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        collect_missing(&[
            ("card_number", self.card_number.as_str()),
            ("card_name", self.card_name.as_str()),
            ("card_expiry", self.card_expiry.as_str()),
            ("card_cvv", self.card_cvv.as_str()),
        ])
    }

    /// Check if every required field is filled.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Card number with all but the last four digits hidden.
    pub fn masked_card_number(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(char::is_ascii_digit).collect();
        if digits.len() <= 4 {
            return "*".repeat(digits.len());
        }
        let last_four: String = digits[digits.len() - 4..].iter().collect();
        format!("{}{last_four}", "*".repeat(digits.len() - 4))
    }
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card_number", &self.masked_card_number())
            .field("card_name", &self.card_name)
            .field("card_expiry", &self.card_expiry)
            .field("card_cvv", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> AddressForm {
        AddressForm {
            zip: "01310-100".to_string(),
            state: "SP".to_string(),
            city: "São Paulo".to_string(),
            neighborhood: "Bela Vista".to_string(),
            street: "Av. Paulista".to_string(),
            number: "1000".to_string(),
            complement: None,
        }
    }

    #[test]
    fn test_identity_missing_fields() {
        let mut form = IdentityForm::new("Ana", "  ", "", "123.456.789-00");
        assert_eq!(form.missing_fields(), vec!["email", "phone"]);

        form.email = "ana@example.com".to_string();
        form.phone = "11 99999-0000".to_string();
        assert!(form.is_complete());
    }

    #[test]
    fn test_complement_is_optional() {
        let form = address();
        assert!(form.is_complete());
        assert_eq!(
            form.one_line(),
            "Av. Paulista, 1000, Bela Vista, São Paulo/SP, 01310-100"
        );
    }

    #[test]
    fn test_empty_address_lists_all_required() {
        assert_eq!(AddressForm::default().missing_fields().len(), 6);
    }

    #[test]
    fn test_payment_debug_is_masked() {
        let form = PaymentForm::new("4111 1111 1111 1234", "ANA SOUZA", "12/30", "987");
        let debug = format!("{form:?}");
        assert!(debug.contains("************1234"));
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("987"));
    }

    #[test]
    fn test_short_card_number_fully_masked() {
        let form = PaymentForm::new("123", "", "", "");
        assert_eq!(form.masked_card_number(), "***");
        assert_eq!(form.missing_fields(), vec!["card_name", "card_expiry", "card_cvv"]);
    }
}
