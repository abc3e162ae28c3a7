//! Runtime metadata model
//!
//! Wire layout of a metadata blob:
//! - magic number `"meta"` (u32 `0x6174656d`)
//! - version byte (4)
//! - `Vec<ModuleMetadata>` in declaration order
//!
//! Declaration order is the binary call index: the module index counts only
//! modules that declare calls, and the function index is the position within
//! the module's call list.

use crate::codec::{Decode, Encode, Input};
use crate::error::{DecodeError, WasmSubstrateError};

/// `"meta"` read as a little-endian u32
pub const METADATA_MAGIC: u32 = 0x6174_656d;
pub const METADATA_VERSION: u8 = 4;

/// Encode/Decode as the concatenation of the listed fields
macro_rules! impl_struct_codec {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl Encode for $name {
            fn encode_to(&self, dest: &mut Vec<u8>) {
                $(self.$field.encode_to(dest);)+
            }
        }

        impl Decode for $name {
            fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
                Ok($name {
                    $($field: Decode::decode(input)?,)+
                })
            }
        }
    };
}

/// `(module index, function index)` pair identifying a chain function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallIndex {
    pub module_index: u8,
    pub function_index: u8,
}

impl_struct_codec!(CallIndex {
    module_index,
    function_index
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub modules: Vec<ModuleMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleMetadata {
    pub name: String,
    /// Storage prefix, also accepted as an alias of `name`
    pub prefix: String,
    pub storage: Option<Vec<StorageEntry>>,
    pub calls: Option<Vec<FunctionMetadata>>,
    pub events: Option<Vec<EventMetadata>>,
}

impl_struct_codec!(ModuleMetadata {
    name,
    prefix,
    storage,
    calls,
    events
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub name: String,
    pub modifier: StorageModifier,
    pub ty: StorageEntryType,
    pub default: Vec<u8>,
    pub documentation: Vec<String>,
}

impl_struct_codec!(StorageEntry {
    name,
    modifier,
    ty,
    default,
    documentation
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageModifier {
    Optional,
    Default,
}

impl Encode for StorageModifier {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(*self as u8);
    }
}

impl Decode for StorageModifier {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0 => Ok(StorageModifier::Optional),
            1 => Ok(StorageModifier::Default),
            index => Err(DecodeError::InvalidDiscriminant {
                type_name: "StorageModifier",
                index,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Twox128,
    Twox256,
    Twox64Concat,
}

impl Encode for StorageHasher {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(*self as u8);
    }
}

impl Decode for StorageHasher {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0 => Ok(StorageHasher::Blake2_128),
            1 => Ok(StorageHasher::Blake2_256),
            2 => Ok(StorageHasher::Twox128),
            3 => Ok(StorageHasher::Twox256),
            4 => Ok(StorageHasher::Twox64Concat),
            index => Err(DecodeError::InvalidDiscriminant {
                type_name: "StorageHasher",
                index,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEntryType {
    Plain(String),
    Map {
        hasher: StorageHasher,
        key: String,
        value: String,
        linked: bool,
    },
    DoubleMap {
        hasher: StorageHasher,
        key1: String,
        key2: String,
        value: String,
        key2_hasher: String,
    },
}

impl Encode for StorageEntryType {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            StorageEntryType::Plain(ty) => {
                dest.push(0);
                ty.encode_to(dest);
            }
            StorageEntryType::Map {
                hasher,
                key,
                value,
                linked,
            } => {
                dest.push(1);
                (hasher, key, value, linked).encode_to(dest);
            }
            StorageEntryType::DoubleMap {
                hasher,
                key1,
                key2,
                value,
                key2_hasher,
            } => {
                dest.push(2);
                (hasher, key1, key2, value, key2_hasher).encode_to(dest);
            }
        }
    }
}

impl Decode for StorageEntryType {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0 => Ok(StorageEntryType::Plain(String::decode(input)?)),
            1 => {
                let (hasher, key, value, linked) = Decode::decode(input)?;
                Ok(StorageEntryType::Map {
                    hasher,
                    key,
                    value,
                    linked,
                })
            }
            2 => {
                let (hasher, key1, key2, value, key2_hasher) = Decode::decode(input)?;
                Ok(StorageEntryType::DoubleMap {
                    hasher,
                    key1,
                    key2,
                    value,
                    key2_hasher,
                })
            }
            index => Err(DecodeError::InvalidDiscriminant {
                type_name: "StorageEntryType",
                index,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionMetadata {
    pub name: String,
    pub arguments: Vec<FunctionArgument>,
    pub documentation: Vec<String>,
}

impl_struct_codec!(FunctionMetadata {
    name,
    arguments,
    documentation
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArgument {
    pub name: String,
    /// Type name as declared by the runtime, e.g. `Compact<T::Balance>`
    pub ty: String,
}

impl_struct_codec!(FunctionArgument { name, ty });

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub name: String,
    pub arguments: Vec<String>,
    pub documentation: Vec<String>,
}

impl_struct_codec!(EventMetadata {
    name,
    arguments,
    documentation
});

impl Encode for Metadata {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        METADATA_MAGIC.encode_to(dest);
        METADATA_VERSION.encode_to(dest);
        self.modules.encode_to(dest);
    }
}

impl Decode for Metadata {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let magic = u32::decode(input)?;
        if magic != METADATA_MAGIC {
            return Err(DecodeError::InvalidMetadataMagic(magic));
        }
        let version = u8::decode(input)?;
        if version != METADATA_VERSION {
            return Err(DecodeError::UnsupportedMetadataVersion(version));
        }
        let modules = Vec::<ModuleMetadata>::decode(input)?;
        tracing::debug!(modules = modules.len(), "decoded runtime metadata");
        Ok(Metadata { modules })
    }
}

/// Case-insensitive comparison that also ignores underscores, so
/// `transfer_keep_alive` matches `transferKeepAlive`
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    let normalized = |s: &str| {
        s.chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect::<String>()
    };
    normalized(a) == normalized(b)
}

impl ModuleMetadata {
    /// True if `name` refers to this module by name or storage prefix
    pub fn matches(&self, name: &str) -> bool {
        names_match(&self.name, name) || (!self.prefix.is_empty() && names_match(&self.prefix, name))
    }
}

impl Metadata {
    /// Modules that declare calls, paired with their position among them
    ///
    /// Only the first 256 positions are addressable by a call index.
    pub fn call_modules(&self) -> impl Iterator<Item = (usize, &ModuleMetadata, &[FunctionMetadata])> {
        self.modules
            .iter()
            .filter_map(|module| module.calls.as_deref().map(|calls| (module, calls)))
            .enumerate()
            .map(|(index, (module, calls))| (index, module, calls))
    }

    /// Resolve a module/function name pair to its call index
    ///
    /// The first module whose name or prefix matches wins; the function must
    /// then exist in that module.
    pub fn find_call_index(
        &self,
        module: &str,
        function: &str,
    ) -> Result<CallIndex, WasmSubstrateError> {
        let (module_index, module_meta, calls) = self
            .call_modules()
            .find(|(_, meta, _)| meta.matches(module))
            .ok_or_else(|| {
                WasmSubstrateError::UnknownCall(format!("module {} not found in metadata", module))
            })?;

        let function_index = calls
            .iter()
            .position(|f| names_match(&f.name, function))
            .ok_or_else(|| {
                WasmSubstrateError::UnknownCall(format!(
                    "function {} not found within module {}",
                    function, module_meta.name
                ))
            })?;

        let out_of_range = |what: &str, index: usize| {
            WasmSubstrateError::UnknownCall(format!(
                "{}.{} has {} index {} beyond the call index range",
                module_meta.name, function, what, index
            ))
        };
        Ok(CallIndex {
            module_index: u8::try_from(module_index)
                .map_err(|_| out_of_range("module", module_index))?,
            function_index: u8::try_from(function_index)
                .map_err(|_| out_of_range("function", function_index))?,
        })
    }

    /// Function metadata at a call index
    pub fn function(&self, index: CallIndex) -> Result<(&ModuleMetadata, &FunctionMetadata), WasmSubstrateError> {
        self.call_modules()
            .nth(index.module_index as usize)
            .and_then(|(_, module, calls)| {
                calls
                    .get(index.function_index as usize)
                    .map(|function| (module, function))
            })
            .ok_or_else(|| {
                WasmSubstrateError::UnknownCall(format!(
                    "no function at call index ({}, {})",
                    index.module_index, index.function_index
                ))
            })
    }

    /// Declared argument type names of the function at a call index
    pub fn argument_types_for(
        &self,
        module_index: u8,
        function_index: u8,
    ) -> Result<Vec<&str>, WasmSubstrateError> {
        let (_, function) = self.function(CallIndex {
            module_index,
            function_index,
        })?;
        Ok(function.arguments.iter().map(|arg| arg.ty.as_str()).collect())
    }

    /// Storage item lookup by module name (or prefix) and item name
    pub fn find_storage_entry(
        &self,
        module: &str,
        item: &str,
    ) -> Result<(&ModuleMetadata, &StorageEntry), WasmSubstrateError> {
        self.modules
            .iter()
            .filter(|m| m.matches(module))
            .find_map(|m| {
                m.storage
                    .as_deref()?
                    .iter()
                    .find(|entry| names_match(&entry.name, item))
                    .map(|entry| (m, entry))
            })
            .ok_or_else(|| {
                WasmSubstrateError::UnknownCall(format!(
                    "storage item {}.{} not found in metadata",
                    module, item
                ))
            })
    }
}
