use std::fmt;
use std::rc::Rc;

use crate::origin::StorageMap;
use crate::{Error, Result, Value, require_args};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Local,
    Session,
}

impl StorageKind {
    pub fn global_name(&self) -> &'static str {
        match self {
            Self::Local => "localStorage",
            Self::Session => "sessionStorage",
        }
    }
}

/// Opaque identity of one [`StorageArea`], compared against the receiver of
/// `clear()` / `length` so a detached method cannot be replayed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageToken(pub(crate) u64);

/// `localStorage` / `sessionStorage` view over an origin's shared map.
#[derive(Clone)]
pub struct StorageArea {
    kind: StorageKind,
    token: StorageToken,
    map: Rc<StorageMap>,
}

impl fmt::Debug for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageArea")
            .field("kind", &self.kind)
            .field("token", &self.token)
            .field("length", &self.map.len())
            .finish()
    }
}

impl StorageArea {
    pub(crate) fn new(kind: StorageKind, token: StorageToken, map: Rc<StorageMap>) -> Self {
        Self { kind, token, map }
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn token(&self) -> StorageToken {
        self.token
    }

    pub fn to_string_tag(&self) -> &'static str {
        "Storage"
    }

    pub fn key(&self, index: usize) -> Option<String> {
        self.map.key(index)
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.map.get(key)
    }

    pub fn set_item(&self, key: &str, value: &str) {
        self.map.set(key, value);
    }

    pub fn remove_item(&self, key: &str) {
        self.map.remove(key);
    }

    pub fn clear(&self) {
        self.map.clear();
    }

    pub fn length(&self) -> usize {
        self.map.len()
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.map.snapshot()
    }

    /// `clear()` invoked with an explicit receiver; `None` stands for a
    /// detached call (`const c = localStorage.clear; c()`).
    pub fn clear_with_receiver(&self, receiver: Option<StorageToken>) -> Result<()> {
        self.check_receiver(receiver)?;
        self.map.clear();
        Ok(())
    }

    pub fn length_with_receiver(&self, receiver: Option<StorageToken>) -> Result<usize> {
        self.check_receiver(receiver)?;
        Ok(self.map.len())
    }

    /// Guest method call by name. Returns `Ok(None)` when `member` is not a
    /// Storage method.
    pub fn invoke(
        &self,
        receiver: Option<StorageToken>,
        member: &str,
        args: &[Value],
    ) -> Result<Option<Value>> {
        match member {
            "key" => {
                require_args("Storage", "key", 1, args)?;
                let index = args[0].as_u32_wrapping() as usize;
                Ok(Some(self.map.key(index).into()))
            }
            "getItem" => {
                require_args("Storage", "getItem", 1, args)?;
                Ok(Some(self.map.get(&args[0].as_string()).into()))
            }
            "setItem" => {
                require_args("Storage", "setItem", 2, args)?;
                self.map.set(&args[0].as_string(), &args[1].as_string());
                Ok(Some(Value::Undefined))
            }
            "removeItem" => {
                require_args("Storage", "removeItem", 1, args)?;
                self.map.remove(&args[0].as_string());
                Ok(Some(Value::Undefined))
            }
            "clear" => {
                self.clear_with_receiver(receiver)?;
                Ok(Some(Value::Undefined))
            }
            _ => Ok(None),
        }
    }

    fn check_receiver(&self, receiver: Option<StorageToken>) -> Result<()> {
        if receiver == Some(self.token) {
            Ok(())
        } else {
            Err(Error::TypeError("Illegal invocation".into()))
        }
    }
}
