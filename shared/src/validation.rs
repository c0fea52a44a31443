//! Validation utilities for the Mise restaurant platform

use chrono::NaiveDate;
use rust_decimal::Decimal;

// ============================================================================
// Sales Validations
// ============================================================================

/// Parse a sale date in the `YYYY-MM-DD` form the entry screens send
pub fn validate_sale_date(date: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| "Invalid sale date")
}

/// Sold quantities must be strictly positive
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Prices and costs may be zero (giveaways) but never negative
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Inventory Validations
// ============================================================================

/// Stock quantities and thresholds cannot be negative
pub fn validate_stock_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Stock quantity cannot be negative");
    }
    Ok(())
}

/// Measurement units are short free-form labels ("g", "kg", "pcs", "ml")
pub fn validate_unit(unit: &str) -> Result<(), &'static str> {
    if unit.trim().is_empty() {
        return Err("Unit is required");
    }
    if unit.len() > 16 {
        return Err("Unit must be at most 16 characters");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Business and display names: non-empty, bounded
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    if name.len() > 120 {
        return Err("Name must be at most 120 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_sale_date_valid() {
        assert_eq!(
            validate_sale_date("2025-06-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_validate_sale_date_invalid() {
        assert!(validate_sale_date("01/06/2025").is_err());
        assert!(validate_sale_date("2025-13-01").is_err());
        assert!(validate_sale_date("").is_err());
        assert!(validate_sale_date("yesterday").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(250).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(dec("9.50")).is_ok());
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(dec("-0.01")).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(dec("0")).is_ok());
        assert!(validate_stock_quantity(dec("12.5")).is_ok());
        assert!(validate_stock_quantity(dec("-1")).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("g").is_ok());
        assert!(validate_unit("pcs").is_ok());
        assert!(validate_unit("").is_err());
        assert!(validate_unit("   ").is_err());
        assert!(validate_unit("a-very-long-unit-name").is_err());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Casa Mia").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  ").is_err());
        assert!(validate_name(&"x".repeat(121)).is_err());
    }
}
