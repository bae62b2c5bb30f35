use crate::utils::error::{AppError, AppResult};

pub fn parse_quantity(value: &str) -> AppResult<i64> {
    let quantity: i64 = value
        .parse()
        .map_err(|_| AppError::Validation("Quantity must be an integer".to_string()))?;

    if quantity < 0 {
        return Err(AppError::Validation(
            "Quantity cannot be negative".to_string(),
        ));
    }

    Ok(quantity)
}

pub fn parse_server_id(value: &str) -> AppResult<i64> {
    value
        .parse()
        .map_err(|_| AppError::Validation("Server id must be an integer".to_string()))
}
