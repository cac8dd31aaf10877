//! Typed runtime arguments (`CLValue`s).
//!
//! A `CLValue` pairs a type descriptor with the bytesrepr encoding of a
//! value. The bytes are authoritative: the JSON `parsed` field is always
//! regenerated from them, so a value read from JSON serializes back exactly.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wallet_core::BuilderError;
use wallet_primitives::util::{ByteReader, ByteWriter};

use crate::bytesrepr::{
    length_u32, read_biguint, read_prefixed_bytes, read_string, write_biguint, write_string,
};
use crate::keys::CsprPublicKey;

const TAG_BOOL: u8 = 0;
const TAG_I32: u8 = 1;
const TAG_I64: u8 = 2;
const TAG_U8: u8 = 3;
const TAG_U32: u8 = 4;
const TAG_U64: u8 = 5;
const TAG_U128: u8 = 6;
const TAG_U256: u8 = 7;
const TAG_U512: u8 = 8;
const TAG_UNIT: u8 = 9;
const TAG_STRING: u8 = 10;
const TAG_OPTION: u8 = 13;
const TAG_LIST: u8 = 14;
const TAG_BYTE_ARRAY: u8 = 15;
const TAG_PUBLIC_KEY: u8 = 22;

/// Type descriptor of a runtime argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CLType {
    Bool,
    I32,
    I64,
    U8,
    U32,
    U64,
    U128,
    U256,
    U512,
    Unit,
    String,
    Option(Box<CLType>),
    List(Box<CLType>),
    ByteArray(u32),
    PublicKey,
}

impl CLType {
    /// Append the type's binary descriptor.
    pub fn write_bytes(&self, writer: &mut ByteWriter) {
        match self {
            CLType::Bool => writer.write_u8(TAG_BOOL),
            CLType::I32 => writer.write_u8(TAG_I32),
            CLType::I64 => writer.write_u8(TAG_I64),
            CLType::U8 => writer.write_u8(TAG_U8),
            CLType::U32 => writer.write_u8(TAG_U32),
            CLType::U64 => writer.write_u8(TAG_U64),
            CLType::U128 => writer.write_u8(TAG_U128),
            CLType::U256 => writer.write_u8(TAG_U256),
            CLType::U512 => writer.write_u8(TAG_U512),
            CLType::Unit => writer.write_u8(TAG_UNIT),
            CLType::String => writer.write_u8(TAG_STRING),
            CLType::Option(inner) => {
                writer.write_u8(TAG_OPTION);
                inner.write_bytes(writer);
            }
            CLType::List(inner) => {
                writer.write_u8(TAG_LIST);
                inner.write_bytes(writer);
            }
            CLType::ByteArray(len) => {
                writer.write_u8(TAG_BYTE_ARRAY);
                writer.write_u32_le(*len);
            }
            CLType::PublicKey => writer.write_u8(TAG_PUBLIC_KEY),
        }
    }

    /// JSON descriptor: a bare name, or a single-key object for
    /// parameterized types.
    pub fn to_json(&self) -> Value {
        match self {
            CLType::Option(inner) => serde_json::json!({ "Option": inner.to_json() }),
            CLType::List(inner) => serde_json::json!({ "List": inner.to_json() }),
            CLType::ByteArray(len) => serde_json::json!({ "ByteArray": len }),
            simple => Value::String(simple.to_string()),
        }
    }

    /// Parse a JSON descriptor.
    pub fn from_json(value: &Value) -> Result<Self, BuilderError> {
        let unsupported = || BuilderError::Parse(format!("unsupported cl_type {}", value));
        match value {
            Value::String(name) => match name.as_str() {
                "Bool" => Ok(CLType::Bool),
                "I32" => Ok(CLType::I32),
                "I64" => Ok(CLType::I64),
                "U8" => Ok(CLType::U8),
                "U32" => Ok(CLType::U32),
                "U64" => Ok(CLType::U64),
                "U128" => Ok(CLType::U128),
                "U256" => Ok(CLType::U256),
                "U512" => Ok(CLType::U512),
                "Unit" => Ok(CLType::Unit),
                "String" => Ok(CLType::String),
                "PublicKey" => Ok(CLType::PublicKey),
                _ => Err(unsupported()),
            },
            Value::Object(map) if map.len() == 1 => {
                let (name, inner) = map.iter().next().ok_or_else(unsupported)?;
                match name.as_str() {
                    "Option" => Ok(CLType::Option(Box::new(Self::from_json(inner)?))),
                    "List" => Ok(CLType::List(Box::new(Self::from_json(inner)?))),
                    "ByteArray" => inner
                        .as_u64()
                        .and_then(|len| u32::try_from(len).ok())
                        .map(CLType::ByteArray)
                        .ok_or_else(unsupported),
                    _ => Err(unsupported()),
                }
            }
            _ => Err(unsupported()),
        }
    }

    /// Decode one value of this type, returning its `parsed` JSON form.
    fn read_parsed(&self, reader: &mut ByteReader<'_>) -> Result<Value, BuilderError> {
        Ok(match self {
            CLType::Bool => match reader.read_u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                other => {
                    return Err(BuilderError::Parse(format!("invalid bool byte {}", other)));
                }
            },
            CLType::I32 => Value::from(i32::from_le_bytes(reader.read_array::<4>()?)),
            CLType::I64 => Value::from(i64::from_le_bytes(reader.read_array::<8>()?)),
            CLType::U8 => Value::from(reader.read_u8()?),
            CLType::U32 => Value::from(reader.read_u32_le()?),
            CLType::U64 => Value::from(reader.read_u64_le()?),
            CLType::U128 => Value::String(read_biguint(reader, 16)?.to_string()),
            CLType::U256 => Value::String(read_biguint(reader, 32)?.to_string()),
            CLType::U512 => Value::String(read_biguint(reader, 64)?.to_string()),
            CLType::Unit => Value::Null,
            CLType::String => Value::String(read_string(reader)?),
            CLType::Option(inner) => match reader.read_u8()? {
                0 => Value::Null,
                1 => inner.read_parsed(reader)?,
                other => {
                    return Err(BuilderError::Parse(format!("invalid option tag {}", other)));
                }
            },
            CLType::List(inner) => {
                let count = reader.read_u32_le()?;
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(inner.read_parsed(reader)?);
                }
                Value::Array(items)
            }
            CLType::ByteArray(len) => Value::String(hex::encode(reader.read_bytes(*len as usize)?)),
            CLType::PublicKey => Value::String(CsprPublicKey::read_from(reader)?.to_hex()),
        })
    }
}

impl fmt::Display for CLType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLType::Bool => write!(f, "Bool"),
            CLType::I32 => write!(f, "I32"),
            CLType::I64 => write!(f, "I64"),
            CLType::U8 => write!(f, "U8"),
            CLType::U32 => write!(f, "U32"),
            CLType::U64 => write!(f, "U64"),
            CLType::U128 => write!(f, "U128"),
            CLType::U256 => write!(f, "U256"),
            CLType::U512 => write!(f, "U512"),
            CLType::Unit => write!(f, "Unit"),
            CLType::String => write!(f, "String"),
            CLType::Option(inner) => write!(f, "Option({})", inner),
            CLType::List(inner) => write!(f, "List({})", inner),
            CLType::ByteArray(len) => write!(f, "ByteArray({})", len),
            CLType::PublicKey => write!(f, "PublicKey"),
        }
    }
}

/// JSON form of a `CLValue`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonCLValue {
    pub cl_type: Value,
    pub bytes: String,
    #[serde(default)]
    pub parsed: Value,
}

/// A typed, encoded runtime argument value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CLValue {
    cl_type: CLType,
    bytes: Vec<u8>,
}

impl CLValue {
    /// Pair a type with encoded bytes, checking that the bytes decode as
    /// exactly one value of that type.
    pub fn from_parts(cl_type: CLType, bytes: Vec<u8>) -> Result<Self, BuilderError> {
        let value = CLValue { cl_type, bytes };
        value.parsed()?;
        Ok(value)
    }

    fn encoded(cl_type: CLType, write: impl FnOnce(&mut ByteWriter)) -> Self {
        let mut writer = ByteWriter::new();
        write(&mut writer);
        CLValue {
            cl_type,
            bytes: writer.into_bytes(),
        }
    }

    pub fn bool(value: bool) -> Self {
        Self::encoded(CLType::Bool, |w| w.write_u8(value as u8))
    }

    pub fn u8(value: u8) -> Self {
        Self::encoded(CLType::U8, |w| w.write_u8(value))
    }

    pub fn u32(value: u32) -> Self {
        Self::encoded(CLType::U32, |w| w.write_u32_le(value))
    }

    pub fn u64(value: u64) -> Self {
        Self::encoded(CLType::U64, |w| w.write_u64_le(value))
    }

    pub fn i32(value: i32) -> Self {
        Self::encoded(CLType::I32, |w| w.write_bytes(&value.to_le_bytes()))
    }

    pub fn i64(value: i64) -> Self {
        Self::encoded(CLType::I64, |w| w.write_bytes(&value.to_le_bytes()))
    }

    pub fn unit() -> Self {
        CLValue {
            cl_type: CLType::Unit,
            bytes: Vec::new(),
        }
    }

    /// A `U512` amount.
    ///
    /// # Returns
    /// The value, or `InvalidParameterValue` if it exceeds 512 bits.
    pub fn u512(value: &BigUint) -> Result<Self, BuilderError> {
        let mut writer = ByteWriter::new();
        write_biguint(&mut writer, value, 64)?;
        Ok(CLValue {
            cl_type: CLType::U512,
            bytes: writer.into_bytes(),
        })
    }

    pub fn string(value: &str) -> Result<Self, BuilderError> {
        let mut writer = ByteWriter::new();
        write_string(&mut writer, value)?;
        Ok(CLValue {
            cl_type: CLType::String,
            bytes: writer.into_bytes(),
        })
    }

    pub fn public_key(key: &CsprPublicKey) -> Self {
        Self::encoded(CLType::PublicKey, |w| w.write_bytes(&key.to_tagged_bytes()))
    }

    pub fn byte_array(bytes: &[u8]) -> Result<Self, BuilderError> {
        Ok(CLValue {
            cl_type: CLType::ByteArray(length_u32(bytes.len())?),
            bytes: bytes.to_vec(),
        })
    }

    /// An `Option<U64>`, the type of a transfer id.
    pub fn option_u64(value: Option<u64>) -> Self {
        Self::encoded(CLType::Option(Box::new(CLType::U64)), |w| match value {
            Some(v) => {
                w.write_u8(1);
                w.write_u64_le(v);
            }
            None => w.write_u8(0),
        })
    }

    pub fn cl_type(&self) -> &CLType {
        &self.cl_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Append `u32 len || bytes || cl_type`.
    pub fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), BuilderError> {
        writer.write_u32_le(length_u32(self.bytes.len())?);
        writer.write_bytes(&self.bytes);
        self.cl_type.write_bytes(writer);
        Ok(())
    }

    /// The `parsed` JSON rendering of the value.
    pub fn parsed(&self) -> Result<Value, BuilderError> {
        let mut reader = ByteReader::new(&self.bytes);
        let parsed = self.cl_type.read_parsed(&mut reader)?;
        if !reader.is_empty() {
            return Err(BuilderError::Parse(format!(
                "{} trailing bytes after {} value",
                reader.remaining(),
                self.cl_type
            )));
        }
        Ok(parsed)
    }

    pub fn to_json(&self) -> Result<JsonCLValue, BuilderError> {
        Ok(JsonCLValue {
            cl_type: self.cl_type.to_json(),
            bytes: hex::encode(&self.bytes),
            parsed: self.parsed()?,
        })
    }

    pub fn from_json(json: &JsonCLValue) -> Result<Self, BuilderError> {
        let cl_type = CLType::from_json(&json.cl_type)?;
        let bytes = hex::decode(&json.bytes)
            .map_err(|e| BuilderError::Parse(format!("invalid value bytes: {}", e)))?;
        Self::from_parts(cl_type, bytes)
    }

    fn expect_type(&self, expected: &CLType) -> Result<ByteReader<'_>, BuilderError> {
        if &self.cl_type != expected {
            return Err(BuilderError::Parse(format!(
                "expected {} value, found {}",
                expected, self.cl_type
            )));
        }
        Ok(ByteReader::new(&self.bytes))
    }

    pub fn as_u512(&self) -> Result<BigUint, BuilderError> {
        let mut reader = self.expect_type(&CLType::U512)?;
        read_biguint(&mut reader, 64)
    }

    pub fn as_u64(&self) -> Result<u64, BuilderError> {
        let mut reader = self.expect_type(&CLType::U64)?;
        Ok(reader.read_u64_le()?)
    }

    pub fn as_string(&self) -> Result<String, BuilderError> {
        let mut reader = self.expect_type(&CLType::String)?;
        read_string(&mut reader)
    }

    pub fn as_public_key(&self) -> Result<CsprPublicKey, BuilderError> {
        let mut reader = self.expect_type(&CLType::PublicKey)?;
        CsprPublicKey::read_from(&mut reader)
    }

    pub fn as_option_u64(&self) -> Result<Option<u64>, BuilderError> {
        let mut reader = self.expect_type(&CLType::Option(Box::new(CLType::U64)))?;
        match reader.read_u8()? {
            0 => Ok(None),
            _ => Ok(Some(reader.read_u64_le()?)),
        }
    }

    pub fn as_byte_array(&self) -> Result<Vec<u8>, BuilderError> {
        match self.cl_type {
            CLType::ByteArray(_) => Ok(self.bytes.clone()),
            _ => Err(BuilderError::Parse(format!(
                "expected ByteArray value, found {}",
                self.cl_type
            ))),
        }
    }

    /// Raw bytes of a `List<U8>` or `ByteArray` value.
    pub fn as_module_bytes(&self) -> Result<Vec<u8>, BuilderError> {
        if self.cl_type == CLType::List(Box::new(CLType::U8)) {
            let mut reader = ByteReader::new(&self.bytes);
            return read_prefixed_bytes(&mut reader);
        }
        self.as_byte_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED25519: &str = "0115c9b40c06ff99b0cbadf1140b061b5dbf92103e66a6330fbcc7768f5219c1ce";

    #[test]
    fn test_u512_json_form() {
        let value = CLValue::u512(&BigUint::from(2_500_000_000u64)).unwrap();
        let json = serde_json::to_value(value.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"cl_type": "U512", "bytes": "0400f90295", "parsed": "2500000000"})
        );
    }

    #[test]
    fn test_option_json_form() {
        let some = CLValue::option_u64(Some(255)).to_json().unwrap();
        assert_eq!(some.cl_type, serde_json::json!({"Option": "U64"}));
        assert_eq!(some.bytes, "01ff00000000000000");
        assert_eq!(some.parsed, serde_json::json!(255));

        let none = CLValue::option_u64(None).to_json().unwrap();
        assert_eq!(none.bytes, "00");
        assert_eq!(none.parsed, Value::Null);
    }

    #[test]
    fn test_public_key_value() {
        let key = CsprPublicKey::from_hex(ED25519).unwrap();
        let value = CLValue::public_key(&key);
        assert_eq!(value.to_json().unwrap().parsed, Value::String(ED25519.to_string()));
        assert_eq!(value.as_public_key().unwrap(), key);
    }

    #[test]
    fn test_json_roundtrip_keeps_bytes() {
        let value = CLValue::byte_array(&[0xde, 0xad]).unwrap();
        let json = value.to_json().unwrap();
        assert_eq!(json.cl_type, serde_json::json!({"ByteArray": 2}));
        assert_eq!(CLValue::from_json(&json).unwrap(), value);
    }

    #[test]
    fn test_parsed_field_is_regenerated() {
        let json = JsonCLValue {
            cl_type: serde_json::json!("U64"),
            bytes: "0500000000000000".to_string(),
            parsed: serde_json::json!("ignored"),
        };
        let value = CLValue::from_json(&json).unwrap();
        assert_eq!(value.to_json().unwrap().parsed, serde_json::json!(5));
    }

    #[test]
    fn test_rejects_inconsistent_bytes() {
        let short = JsonCLValue {
            cl_type: serde_json::json!("U64"),
            bytes: "0500".to_string(),
            parsed: Value::Null,
        };
        assert!(CLValue::from_json(&short).is_err());

        let trailing = JsonCLValue {
            cl_type: serde_json::json!("U8"),
            bytes: "0500".to_string(),
            parsed: Value::Null,
        };
        assert!(CLValue::from_json(&trailing).is_err());
    }

    #[test]
    fn test_rejects_unsupported_types() {
        for ty in [
            serde_json::json!("Key"),
            serde_json::json!("URef"),
            serde_json::json!({"Map": {"key": "U8", "value": "U8"}}),
            serde_json::json!(7),
        ] {
            assert!(CLType::from_json(&ty).is_err(), "{}", ty);
        }
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let value = CLValue::u64(5);
        assert_eq!(value.as_u64().unwrap(), 5);
        let err = value.as_string().unwrap_err();
        assert_eq!(err.to_string(), "expected String value, found U64");
    }

    #[test]
    fn test_binary_layout() {
        let value = CLValue::string("Send").unwrap();
        let mut w = ByteWriter::new();
        value.write_bytes(&mut w).unwrap();
        assert_eq!(hex::encode(w.as_bytes()), "080000000400000053656e640a");
    }
}
