#![forbid(unsafe_code)]

use alloy_primitives::{Address, U256};

use crate::chain;

use super::error::RpcError;

pub fn parse_address(field: &str, value: &str) -> Result<Address, RpcError> {
    chain::parse_address(value)
        .map_err(|_| RpcError::InvalidParams(format!("{field}: invalid address {value:?}")))
}

pub fn parse_token_id(field: &str, value: &str) -> Result<U256, RpcError> {
    chain::parse_token_id(value)
        .map_err(|_| RpcError::InvalidParams(format!("{field}: invalid token id {value:?}")))
}

pub fn parse_amount(field: &str, value: &str) -> Result<U256, RpcError> {
    U256::from_str_radix(value, 10)
        .map_err(|_| RpcError::InvalidParams(format!("{field}: invalid decimal amount {value:?}")))
}

pub fn parse_token_ids(field: &str, values: &[String]) -> Result<Vec<U256>, RpcError> {
    if values.is_empty() {
        return Err(RpcError::InvalidParams(format!("{field}: empty list")));
    }
    values
        .iter()
        .map(|value| parse_token_id(field, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_amount, parse_token_ids};
    use crate::api::jsonrpc::error::RpcError;
    use alloy_primitives::U256;

    #[test]
    fn amounts_are_decimal_strings() {
        assert_eq!(
            parse_amount("amount", "1000000").expect("decimal"),
            U256::from(1_000_000u64)
        );
        assert!(matches!(
            parse_amount("amount", "0xf4240"),
            Err(RpcError::InvalidParams(_))
        ));
    }

    #[test]
    fn token_id_lists_must_be_non_empty() {
        assert!(matches!(
            parse_token_ids("token_ids", &[]),
            Err(RpcError::InvalidParams(_))
        ));
        let ids = parse_token_ids("token_ids", &["1".to_string(), "2".to_string()])
            .expect("parse");
        assert_eq!(ids, vec![U256::from(1u64), U256::from(2u64)]);
    }
}
