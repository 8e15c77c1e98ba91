//! Renderer control protocol
//!
//! Control events handed to the renderer's event input, framed as small
//! little-endian property objects:
//!
//! ```text
//! [body_size: u32][object_type: u32]            header (body_size counts everything after itself)
//! [key: u32][value_type: u32][value: 4 bytes]   repeated per property
//! ```
//!
//! Messages are forged one at a time into a fixed scratch buffer, so forging
//! never allocates.

use thiserror::Error;

/// Scratch buffer size for one forged message
pub const ATOM_BUFFER_SIZE: usize = 8192;

const HEADER_SIZE: usize = 8;
const PROPERTY_SIZE: usize = 12;
const MAX_PROPERTIES: usize = 7;

// ═══════════════════════════════════════════════════════════════════════════
// WIRE IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════

/// Object type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ObjectType {
    Settings = 1,
    MetaData = 2,
}

impl ObjectType {
    fn from_u32(v: u32) -> Result<Self, ProtocolError> {
        match v {
            1 => Ok(Self::Settings),
            2 => Ok(Self::MetaData),
            other => Err(ProtocolError::UnknownObjectType(other)),
        }
    }
}

/// Property key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PropertyKey {
    Frame = 1,
    Channel = 2,
    ChannelCount = 3,
    BinauralRenderMode = 4,
    PosX = 5,
    PosY = 6,
    PosZ = 7,
    Size = 8,
    Snap = 9,
}

impl PropertyKey {
    const ALL: [PropertyKey; 9] = [
        PropertyKey::Frame,
        PropertyKey::Channel,
        PropertyKey::ChannelCount,
        PropertyKey::BinauralRenderMode,
        PropertyKey::PosX,
        PropertyKey::PosY,
        PropertyKey::PosZ,
        PropertyKey::Size,
        PropertyKey::Snap,
    ];

    fn from_u32(v: u32) -> Result<Self, ProtocolError> {
        Self::ALL
            .into_iter()
            .find(|k| *k as u32 == v)
            .ok_or(ProtocolError::UnknownKey(v))
    }

    fn slot(self) -> usize {
        self as usize - 1
    }
}

/// Typed property value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
}

impl Value {
    fn type_tag(self) -> u32 {
        match self {
            Value::Int(_) => 1,
            Value::Float(_) => 2,
            Value::Bool(_) => 3,
        }
    }

    fn to_le_bytes(self) -> [u8; 4] {
        match self {
            Value::Int(v) => v.to_le_bytes(),
            Value::Float(v) => v.to_le_bytes(),
            Value::Bool(v) => u32::from(v).to_le_bytes(),
        }
    }

    fn from_wire(type_tag: u32, raw: [u8; 4]) -> Result<Self, ProtocolError> {
        match type_tag {
            1 => Ok(Value::Int(i32::from_le_bytes(raw))),
            2 => Ok(Value::Float(f32::from_le_bytes(raw))),
            3 => Ok(Value::Bool(u32::from_le_bytes(raw) != 0)),
            other => Err(ProtocolError::UnknownValueType(other)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════

/// Protocol error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Message does not fit the scratch buffer
    #[error("Control message overflow: need {needed} bytes, buffer holds {capacity}")]
    Overflow { needed: usize, capacity: usize },

    /// Input shorter than its header claims
    #[error("Truncated message: expected {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("Unknown object type: {0}")]
    UnknownObjectType(u32),

    #[error("Unknown property key: {0}")]
    UnknownKey(u32),

    #[error("Unknown value type: {0}")]
    UnknownValueType(u32),

    /// Property present with the wrong value type
    #[error("Property {key:?} has unexpected type")]
    TypeMismatch { key: PropertyKey },

    /// Object is missing a property its type requires
    #[error("Missing property {0:?}")]
    MissingProperty(PropertyKey),
}

// ═══════════════════════════════════════════════════════════════════════════
// MESSAGES
// ═══════════════════════════════════════════════════════════════════════════

/// A control event for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    /// Number of object ids in use changed
    ObjectCount { count: i32 },
    /// Binaural render mode of one object changed (applies at block start)
    RenderMode { channel: i32, mode: i32 },
    /// Sample-accurate pan update for one object
    Metadata {
        frame: i32,
        channel: i32,
        x: f32,
        y: f32,
        z: f32,
        size: f32,
        snap: bool,
    },
}

impl ControlMessage {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ControlMessage::ObjectCount { .. } | ControlMessage::RenderMode { .. } => {
                ObjectType::Settings
            }
            ControlMessage::Metadata { .. } => ObjectType::MetaData,
        }
    }

    /// Properties in wire order
    fn properties(&self) -> ([(PropertyKey, Value); MAX_PROPERTIES], usize) {
        let mut props = [(PropertyKey::Frame, Value::Int(0)); MAX_PROPERTIES];
        let n = match *self {
            ControlMessage::ObjectCount { count } => {
                props[0] = (PropertyKey::ChannelCount, Value::Int(count));
                1
            }
            ControlMessage::RenderMode { channel, mode } => {
                props[0] = (PropertyKey::Channel, Value::Int(channel));
                props[1] = (PropertyKey::BinauralRenderMode, Value::Int(mode));
                2
            }
            ControlMessage::Metadata {
                frame,
                channel,
                x,
                y,
                z,
                size,
                snap,
            } => {
                props = [
                    (PropertyKey::Frame, Value::Int(frame)),
                    (PropertyKey::Channel, Value::Int(channel)),
                    (PropertyKey::PosX, Value::Float(x)),
                    (PropertyKey::PosY, Value::Float(y)),
                    (PropertyKey::PosZ, Value::Float(z)),
                    (PropertyKey::Size, Value::Float(size)),
                    (PropertyKey::Snap, Value::Bool(snap)),
                ];
                MAX_PROPERTIES
            }
        };
        (props, n)
    }

    /// Size of the framed message in bytes
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.properties().1 * PROPERTY_SIZE
    }

    /// Parse one framed message
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let body_size = read_u32(bytes, 0)? as usize;
        let total = 4 + body_size;
        if bytes.len() < total || body_size < 4 {
            return Err(ProtocolError::Truncated {
                expected: total.max(HEADER_SIZE),
                got: bytes.len(),
            });
        }
        let object_type = ObjectType::from_u32(read_u32(bytes, 4)?)?;

        let mut props: [Option<Value>; PropertyKey::ALL.len()] = [None; PropertyKey::ALL.len()];
        let mut pos = HEADER_SIZE;
        while pos + PROPERTY_SIZE <= total {
            let key = PropertyKey::from_u32(read_u32(bytes, pos)?)?;
            let type_tag = read_u32(bytes, pos + 4)?;
            let raw = read_array(bytes, pos + 8)?;
            props[key.slot()] = Some(Value::from_wire(type_tag, raw)?);
            pos += PROPERTY_SIZE;
        }

        let int = |key: PropertyKey| match props[key.slot()] {
            Some(Value::Int(v)) => Ok(v),
            Some(_) => Err(ProtocolError::TypeMismatch { key }),
            None => Err(ProtocolError::MissingProperty(key)),
        };
        let float = |key: PropertyKey| match props[key.slot()] {
            Some(Value::Float(v)) => Ok(v),
            Some(_) => Err(ProtocolError::TypeMismatch { key }),
            None => Err(ProtocolError::MissingProperty(key)),
        };

        match object_type {
            ObjectType::Settings => {
                if props[PropertyKey::ChannelCount.slot()].is_some() {
                    return Ok(ControlMessage::ObjectCount {
                        count: int(PropertyKey::ChannelCount)?,
                    });
                }
                Ok(ControlMessage::RenderMode {
                    channel: int(PropertyKey::Channel)?,
                    mode: int(PropertyKey::BinauralRenderMode)?,
                })
            }
            ObjectType::MetaData => {
                let snap = match props[PropertyKey::Snap.slot()] {
                    Some(Value::Bool(v)) => v,
                    Some(_) => return Err(ProtocolError::TypeMismatch { key: PropertyKey::Snap }),
                    None => return Err(ProtocolError::MissingProperty(PropertyKey::Snap)),
                };
                Ok(ControlMessage::Metadata {
                    frame: int(PropertyKey::Frame)?,
                    channel: int(PropertyKey::Channel)?,
                    x: float(PropertyKey::PosX)?,
                    y: float(PropertyKey::PosY)?,
                    z: float(PropertyKey::PosZ)?,
                    size: float(PropertyKey::Size)?,
                    snap,
                })
            }
        }
    }
}

fn read_array(bytes: &[u8], at: usize) -> Result<[u8; 4], ProtocolError> {
    bytes
        .get(at..at + 4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or(ProtocolError::Truncated {
            expected: at + 4,
            got: bytes.len(),
        })
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, ProtocolError> {
    read_array(bytes, at).map(u32::from_le_bytes)
}

// ═══════════════════════════════════════════════════════════════════════════
// FORGE
// ═══════════════════════════════════════════════════════════════════════════

/// Fixed scratch buffer that frames one message at a time
#[derive(Debug, Clone)]
pub struct ControlForge {
    buf: Vec<u8>,
}

impl ControlForge {
    pub fn new() -> Self {
        Self::with_capacity(ATOM_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Frame `msg` from offset 0 and return the encoded bytes
    pub fn forge(&mut self, msg: &ControlMessage) -> Result<&[u8], ProtocolError> {
        let (props, n) = msg.properties();
        let needed = HEADER_SIZE + n * PROPERTY_SIZE;
        if needed > self.buf.len() {
            return Err(ProtocolError::Overflow {
                needed,
                capacity: self.buf.len(),
            });
        }

        let body_size = (needed - 4) as u32;
        self.buf[0..4].copy_from_slice(&body_size.to_le_bytes());
        self.buf[4..8].copy_from_slice(&(msg.object_type() as u32).to_le_bytes());

        for (i, (key, value)) in props[..n].iter().enumerate() {
            let at = HEADER_SIZE + i * PROPERTY_SIZE;
            self.buf[at..at + 4].copy_from_slice(&(*key as u32).to_le_bytes());
            self.buf[at + 4..at + 8].copy_from_slice(&value.type_tag().to_le_bytes());
            self.buf[at + 8..at + 12].copy_from_slice(&value.to_le_bytes());
        }

        Ok(&self.buf[..needed])
    }
}

impl Default for ControlForge {
    fn default() -> Self {
        Self::new()
    }
}
