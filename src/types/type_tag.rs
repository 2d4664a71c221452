use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Address;
use crate::error::Error;

/// Move type, BCS-compatible with the on-chain `TypeTag`.
///
/// Variant order is part of the wire format.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    pub address: Address,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { input: s, pos: 0 };
        let tag = parser.type_tag()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(Error::InvalidTypeTag(s.to_string()));
        }
        Ok(tag)
    }
}

impl FromStr for StructTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<TypeTag>()? {
            TypeTag::Struct(tag) => Ok(*tag),
            _ => Err(Error::InvalidTypeTag(s.to_string())),
        }
    }
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn expect(&mut self, c: char) -> Result<(), Error> {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn token(&mut self) -> &'a str {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn error(&self) -> Error {
        Error::InvalidTypeTag(self.input.to_string())
    }

    fn type_tag(&mut self) -> Result<TypeTag, Error> {
        let tag = match self.token() {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => {
                self.expect('<')?;
                let inner = self.type_tag()?;
                self.expect('>')?;
                TypeTag::Vector(Box::new(inner))
            }
            token => {
                let parts: Vec<&str> = token.split("::").collect();
                let [address, module, name] = parts.as_slice() else {
                    return Err(self.error());
                };
                if module.is_empty() || name.is_empty() {
                    return Err(self.error());
                }
                let address = address.parse::<Address>().map_err(|_| self.error())?;
                let type_params = self.type_params()?;
                TypeTag::Struct(Box::new(StructTag {
                    address,
                    module: module.to_string(),
                    name: name.to_string(),
                    type_params,
                }))
            }
        };
        Ok(tag)
    }

    fn type_params(&mut self) -> Result<Vec<TypeTag>, Error> {
        self.skip_ws();
        if self.peek() != Some('<') {
            return Ok(vec![]);
        }
        self.pos += 1;
        let mut params = vec![self.type_tag()?];
        loop {
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    params.push(self.type_tag()?);
                }
                Some('>') => {
                    self.pos += 1;
                    return Ok(params);
                }
                _ => return Err(self.error()),
            }
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => fmt::Display::fmt(tag, f),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if let Some((first, rest)) = self.type_params.split_first() {
            write!(f, "<{first}")?;
            for param in rest {
                write!(f, ", {param}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coin_type() {
        let tag: TypeTag = "0x2::sui::SUI".parse().unwrap();
        let TypeTag::Struct(tag) = tag else {
            panic!("expected struct tag");
        };
        assert_eq!(tag.address, "0x2".parse().unwrap());
        assert_eq!(tag.module, "sui");
        assert_eq!(tag.name, "SUI");
        assert!(tag.type_params.is_empty());
    }

    #[test]
    fn test_parse_nested_generics() {
        let s = "0xdee9::pool::Pool<0x2::sui::SUI, vector<0x2::coin::Coin<0x2::sui::SUI>>>";
        let tag: StructTag = s.parse().unwrap();
        assert_eq!(tag.name, "Pool");
        assert_eq!(tag.type_params.len(), 2);
        assert!(matches!(tag.type_params[1], TypeTag::Vector(_)));
        assert_eq!(
            tag.to_string(),
            "0x000000000000000000000000000000000000000000000000000000000000dee9::pool::Pool<\
             0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI, \
             vector<0x0000000000000000000000000000000000000000000000000000000000000002::coin::Coin<\
             0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI>>>"
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("0x2::sui".parse::<TypeTag>().is_err());
        assert!("0x2::sui::SUI<".parse::<TypeTag>().is_err());
        assert!("0x2::sui::SUI>".parse::<TypeTag>().is_err());
        assert!("vector<u8".parse::<TypeTag>().is_err());
        assert!("".parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_bcs_variant_indices() {
        assert_eq!(bcs::to_bytes(&TypeTag::U64).unwrap(), vec![2]);
        assert_eq!(bcs::to_bytes(&TypeTag::U16).unwrap(), vec![8]);
        let coin: TypeTag = "0x2::sui::SUI".parse().unwrap();
        assert_eq!(bcs::to_bytes(&coin).unwrap()[0], 7);
    }
}
