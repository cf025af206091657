use super::error::FlowLogError;
use super::layout;

pub struct FlowLogReader<'a> {
    fields: Vec<&'a str>,
}

impl<'a> FlowLogReader<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            fields: line.split_whitespace().collect(),
        }
    }

    pub fn require_fields(&self, needed: usize) -> Result<(), FlowLogError> {
        if self.fields.len() < needed {
            return Err(FlowLogError::TooFewFields {
                needed,
                actual: self.fields.len(),
            });
        }
        Ok(())
    }

    pub fn field(&self, index: usize) -> Result<&'a str, FlowLogError> {
        self.fields
            .get(index)
            .copied()
            .ok_or(FlowLogError::TooFewFields {
                needed: index + 1,
                actual: self.fields.len(),
            })
    }

    pub fn read_dst_port(&self) -> Result<u16, FlowLogError> {
        let value = self.field(layout::DST_PORT_FIELD)?;
        parse_unsigned(value).ok_or_else(|| FlowLogError::InvalidPort {
            value: value.to_string(),
        })
    }

    pub fn read_protocol(&self) -> Result<u64, FlowLogError> {
        let value = self.field(layout::PROTOCOL_FIELD)?;
        parse_unsigned(value).ok_or_else(|| FlowLogError::InvalidProtocol {
            value: value.to_string(),
        })
    }

    /// Read a unix-seconds timestamp; absent or non-numeric values are `None`.
    pub fn read_timestamp(&self, index: usize) -> Option<i64> {
        self.fields.get(index).and_then(|value| parse_unsigned(value))
    }
}

fn parse_unsigned<T: std::str::FromStr>(value: &str) -> Option<T> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
