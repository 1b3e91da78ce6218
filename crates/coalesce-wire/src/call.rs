// Numan Thabit 2025
//! Call descriptors and the `[method, service, ...args]` tuple encoding.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Closed set of remote operations understood by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Fetch one resource by id.
    Get,
    /// List resources matching params.
    Find,
    /// Create a resource.
    Create,
    /// Replace a resource.
    Update,
    /// Partially modify a resource.
    Patch,
    /// Delete a resource.
    Remove,
}

impl Method {
    /// Every method, in a stable order.
    pub const ALL: [Method; 6] = [
        Method::Get,
        Method::Find,
        Method::Create,
        Method::Update,
        Method::Patch,
        Method::Remove,
    ];

    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Find => "find",
            Method::Create => "create",
            Method::Update => "update",
            Method::Patch => "patch",
            Method::Remove => "remove",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method name outside the closed set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Method::Get),
            "find" => Ok(Method::Find),
            "create" => Ok(Method::Create),
            "update" => Ok(Method::Update),
            "patch" => Ok(Method::Patch),
            "remove" => Ok(Method::Remove),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// Canonical representation of one remote call.
///
/// Identity is structural: two descriptors name the same call iff method,
/// service and a deep comparison of args all match. Descriptors are
/// immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct CallDescriptor {
    method: Method,
    service: String,
    args: Vec<Value>,
}

impl CallDescriptor {
    /// Descriptor with explicit positional args.
    pub fn new(method: Method, service: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method,
            service: service.into(),
            args,
        }
    }

    /// `find(params?)` on a service.
    pub fn find(service: impl Into<String>, params: Option<Value>) -> Self {
        Self::new(Method::Find, service, with_params(Vec::new(), params))
    }

    /// `get(id, params?)` on a service.
    pub fn get(service: impl Into<String>, id: Value, params: Option<Value>) -> Self {
        Self::new(Method::Get, service, with_params(vec![id], params))
    }

    /// `create(data, params?)` on a service.
    pub fn create(service: impl Into<String>, data: Value, params: Option<Value>) -> Self {
        Self::new(Method::Create, service, with_params(vec![data], params))
    }

    /// `update(id, data, params?)` on a service.
    pub fn update(service: impl Into<String>, id: Value, data: Value, params: Option<Value>) -> Self {
        Self::new(Method::Update, service, with_params(vec![id, data], params))
    }

    /// `patch(id, data, params?)` on a service.
    pub fn patch(service: impl Into<String>, id: Value, data: Value, params: Option<Value>) -> Self {
        Self::new(Method::Patch, service, with_params(vec![id, data], params))
    }

    /// `remove(id, params?)` on a service.
    pub fn remove(service: impl Into<String>, id: Value, params: Option<Value>) -> Self {
        Self::new(Method::Remove, service, with_params(vec![id], params))
    }

    /// The operation this call performs.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Name of the target service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Positional arguments, in call order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

// Missing trailing params are elided rather than sent as null, matching how
// the wire protocol omits absent optional arguments.
fn with_params(mut args: Vec<Value>, params: Option<Value>) -> Vec<Value> {
    if let Some(params) = params {
        args.push(params);
    }
    args
}

/// Wire form of one call: the JSON array `[method, service, ...args]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallTuple(CallDescriptor);

impl CallTuple {
    /// The descriptor carried by this tuple.
    pub fn descriptor(&self) -> &CallDescriptor {
        &self.0
    }

    /// Unwrap into the carried descriptor.
    pub fn into_descriptor(self) -> CallDescriptor {
        self.0
    }
}

impl From<CallDescriptor> for CallTuple {
    fn from(descriptor: CallDescriptor) -> Self {
        Self(descriptor)
    }
}

impl From<CallTuple> for CallDescriptor {
    fn from(tuple: CallTuple) -> Self {
        tuple.0
    }
}

impl Serialize for CallTuple {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let descriptor = &self.0;
        let mut seq = serializer.serialize_seq(Some(2 + descriptor.args.len()))?;
        seq.serialize_element(descriptor.method.as_str())?;
        seq.serialize_element(&descriptor.service)?;
        for arg in &descriptor.args {
            seq.serialize_element(arg)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for CallTuple {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TupleVisitor;

        impl<'de> Visitor<'de> for TupleVisitor {
            type Value = CallTuple;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a `[method, service, ...args]` array")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<CallTuple, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let method: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let method = method.parse::<Method>().map_err(de::Error::custom)?;
                let service: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                if service.is_empty() {
                    return Err(de::Error::custom("empty service name"));
                }
                let mut args = Vec::new();
                while let Some(arg) = seq.next_element::<Value>()? {
                    args.push(arg);
                }
                Ok(CallTuple(CallDescriptor {
                    method,
                    service,
                    args,
                }))
            }
        }

        deserializer.deserialize_seq(TupleVisitor)
    }
}
