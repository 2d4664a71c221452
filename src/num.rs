use fastnum::{UD128, decimal::Context};

use crate::error::{Error, Result};

/// Converter between human-readable coin amounts and on-chain base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Converter {
    decimals: u8,
}

impl Converter {
    /// Coin decimals above 19 do not fit a `u64` scalar.
    pub const MAX_DECIMALS: u8 = 19;

    pub fn new(decimals: u8) -> Result<Self> {
        if decimals > Self::MAX_DECIMALS {
            return Err(Error::InvalidDecimals(decimals));
        }
        Ok(Self { decimals })
    }

    /// Converter for a decimal count known at compile time.
    pub const fn fixed<const DECIMALS: u8>() -> Self {
        const { assert!(DECIMALS <= Self::MAX_DECIMALS) };
        Self { decimals: DECIMALS }
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Number of base units in one whole coin.
    pub fn scalar(&self) -> u64 {
        10u64.pow(self.decimals as u32)
    }

    pub fn from_base_units(&self, value: u64) -> UD128 {
        UD128::from(value) / UD128::from(self.scalar())
    }

    /// Fails when the amount has more precision than the coin or does not
    /// fit into `u64` base units.
    pub fn to_base_units(&self, value: UD128) -> Result<u64> {
        let invalid = || Error::InvalidAmount(value.to_string());
        if !value.is_finite() {
            return Err(invalid());
        }
        let rescaled = value.rescale(self.decimals as i16);
        if rescaled != value {
            return Err(invalid());
        }
        let le = rescaled.digits().to_radix_le(256);
        if le.len() > 8 {
            return Err(invalid());
        }
        let mut bytes = [0u8; 8];
        bytes[..le.len()].copy_from_slice(&le);
        Ok(u64::from_le_bytes(bytes))
    }

    /// Parses a decimal amount such as `"12.5"` into base units.
    pub fn parse(&self, amount: &str) -> Result<u64> {
        self.to_base_units(parse_decimal(amount)?)
            .map_err(|_| Error::InvalidAmount(amount.to_string()))
    }
}

/// Non-negative decimal such as a price or quantity.
pub fn parse_decimal(value: &str) -> Result<UD128> {
    UD128::from_str(value.trim(), Context::default())
        .map_err(|_| Error::InvalidAmount(value.to_string()))
}
