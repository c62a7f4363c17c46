// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Provider registry for externally supplied codecs.
//!
//! Structure identifiers the built-in catalog does not recognize can be
//! served by registered providers. A registration names the provider module
//! and optionally overrides the entry-point name; resolution loads the
//! module, looks the codec up and hands both back so the module stays alive
//! exactly as long as the call that needed it. How modules are actually
//! loaded is the host's business via [`ModuleLoader`]; persisting the
//! registrations is likewise left to the host, which is why entries
//! serialize.

use super::{CERT_ENCODING_TYPE_MASK, ObjectCodec, StructId};
use crate::der::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry value holding the provider module path.
pub const VALUE_MODULE: &str = "Module";
/// Registry value holding the optional entry-point override.
pub const VALUE_FUNC_NAME: &str = "FuncName";

/// A loaded provider module that can resolve codec entry points by name.
pub trait ProviderModule {
    /// Looks up the codec registered under the entry-point name.
    fn resolve(&self, func_name: &str) -> Option<Arc<dyn ObjectCodec>>;
}

/// Loads provider modules from their registered path.
///
/// The codec core never loads modules itself; the host supplies whatever
/// loading mechanism it supports. Loaded modules are reference counted and
/// released when the last resolved codec using them is dropped.
pub trait ModuleLoader {
    /// Loads the module registered under the given path.
    fn load(&self, module: &str) -> Result<Arc<dyn ProviderModule>>;
}

/// A resolved provider codec, keeping the module it came from loaded for as
/// long as the codec is held.
pub struct ResolvedCodec {
    /// The provider's codec entry point.
    pub codec: Arc<dyn ObjectCodec>,
    _module: Arc<dyn ProviderModule>,
}

/// The persisted description of one provider registration: a small map of
/// named values, at minimum the module path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    values: BTreeMap<String, String>,
}

/// Registry mapping (encoding type, function name, structure identifier)
/// keys to provider registrations.
#[derive(Default)]
pub struct ProviderRegistry {
    entries: BTreeMap<String, RegistryEntry>,
    loader: Option<Box<dyn ModuleLoader>>,
}

impl ProviderRegistry {
    /// Creates an empty registry without a module loader; lookups succeed
    /// but never resolve a provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry resolving modules through the given loader.
    pub fn with_loader(loader: Box<dyn ModuleLoader>) -> Self {
        Self {
            entries: BTreeMap::new(),
            loader: Some(loader),
        }
    }

    /// Registers a provider module for the keyed function and structure.
    ///
    /// Registration only applies to certificate encodings: when the encoding
    /// type selects none of those bits, or no module is given, this is a
    /// successful no-op. An empty function name or identifier is invalid.
    pub fn register(
        &mut self,
        encoding_type: u32,
        func_name: &str,
        ident: &StructId,
        module: Option<&str>,
        override_func_name: Option<&str>,
    ) -> Result<()> {
        if encoding_type & CERT_ENCODING_TYPE_MASK == 0 {
            return Ok(());
        }
        let Some(module) = module else {
            return Ok(());
        };
        check_key(func_name, ident)?;

        tracing::debug!(encoding_type, func_name, ident = %ident, module, "registering provider");
        let entry = self
            .entries
            .entry(key_name(encoding_type, func_name, ident))
            .or_default();
        if let Some(func) = override_func_name {
            entry.values.insert(VALUE_FUNC_NAME.into(), func.into());
        }
        entry.values.insert(VALUE_MODULE.into(), module.into());
        Ok(())
    }

    /// Removes a registration; fails when none exists.
    pub fn unregister(
        &mut self,
        encoding_type: u32,
        func_name: &str,
        ident: &StructId,
    ) -> Result<()> {
        if encoding_type & CERT_ENCODING_TYPE_MASK == 0 {
            return Ok(());
        }
        check_key(func_name, ident)?;
        self.entries
            .remove(&key_name(encoding_type, func_name, ident))
            .map(|_| ())
            .ok_or(Error::NotFound)
    }

    /// Reads a named value of a registration. Returns `None` without looking
    /// anything up when the encoding type selects no certificate encoding.
    pub fn get_value(
        &self,
        encoding_type: u32,
        func_name: &str,
        ident: &StructId,
        value_name: &str,
    ) -> Result<Option<&str>> {
        if encoding_type & CERT_ENCODING_TYPE_MASK == 0 {
            return Ok(None);
        }
        check_key(func_name, ident)?;
        if value_name.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let entry = self
            .entries
            .get(&key_name(encoding_type, func_name, ident))
            .ok_or(Error::NotFound)?;
        let value = entry.values.get(value_name).ok_or(Error::NotFound)?;
        Ok(Some(value))
    }

    /// Writes a named value of an existing registration.
    pub fn set_value(
        &mut self,
        encoding_type: u32,
        func_name: &str,
        ident: &StructId,
        value_name: &str,
        value: &str,
    ) -> Result<()> {
        if encoding_type & CERT_ENCODING_TYPE_MASK == 0 {
            return Ok(());
        }
        check_key(func_name, ident)?;
        if value_name.is_empty() {
            return Err(Error::InvalidParameter);
        }
        let entry = self
            .entries
            .get_mut(&key_name(encoding_type, func_name, ident))
            .ok_or(Error::NotFound)?;
        entry.values.insert(value_name.into(), value.into());
        Ok(())
    }

    /// Looks up a registration and resolves its codec: loads the module,
    /// applies the entry-point override if one was registered, and returns
    /// the codec together with the module keeping it alive. Any failure on
    /// the way releases the module again and resolves to `None`, so callers
    /// have nothing to undo.
    pub fn resolve(
        &self,
        encoding_type: u32,
        func_name: &str,
        ident: &StructId,
    ) -> Option<ResolvedCodec> {
        let entry = self.entries.get(&key_name(encoding_type, func_name, ident))?;
        let module_path = entry.values.get(VALUE_MODULE)?;
        let func = entry
            .values
            .get(VALUE_FUNC_NAME)
            .map(String::as_str)
            .unwrap_or(func_name);

        let module = match self.loader.as_ref()?.load(module_path) {
            Ok(module) => module,
            Err(error) => {
                tracing::debug!(module = %module_path, %error, "provider module failed to load");
                return None;
            }
        };
        let codec = module.resolve(func)?;
        Some(ResolvedCodec {
            codec,
            _module: module,
        })
    }

    /// Returns the raw registration entries, e.g. for persisting them.
    pub fn entries(&self) -> &BTreeMap<String, RegistryEntry> {
        &self.entries
    }

    /// Replaces the registration entries, e.g. with persisted ones.
    pub fn restore_entries(&mut self, entries: BTreeMap<String, RegistryEntry>) {
        self.entries = entries;
    }
}

// check_key rejects the key parts that must not be empty.
fn check_key(func_name: &str, ident: &StructId) -> Result<()> {
    if func_name.is_empty() || matches!(ident, StructId::Oid(oid) if oid.is_empty()) {
        return Err(Error::InvalidParameter);
    }
    Ok(())
}

// key_name builds the printable registry key for a codec function. Integer
// identifiers take their #NNNN form. The encoding type is deliberately not
// treated as a mask: a registration under 3 only matches lookups under 3.
fn key_name(encoding_type: u32, func_name: &str, ident: &StructId) -> String {
    format!("EncodingType {}/{}/{}", encoding_type, func_name, ident)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::der::{DecodeFlags, Value};
    use crate::object::{FUNC_ENCODE_OBJECT_EX, X509_ASN_ENCODING};

    // A codec stub that encodes any value as a fixed marker byte.
    struct StubCodec;

    impl ObjectCodec for StubCodec {
        fn encode(
            &self,
            _encoding_type: u32,
            _ident: &StructId,
            _value: &Value<'_>,
            out: Option<&mut [u8]>,
        ) -> Result<usize> {
            if let Some(buf) = out {
                if buf.is_empty() {
                    return Err(Error::MoreData { needed: 1 });
                }
                buf[0] = 0xa5;
            }
            Ok(1)
        }

        fn decode<'a>(
            &self,
            _encoding_type: u32,
            _ident: &StructId,
            _data: &'a [u8],
            _flags: DecodeFlags,
        ) -> Result<Value<'a>> {
            Ok(Value::Enumerated(0))
        }
    }

    // A module stub resolving exactly one entry-point name.
    struct StubModule {
        func_name: &'static str,
    }

    impl ProviderModule for StubModule {
        fn resolve(&self, func_name: &str) -> Option<Arc<dyn ObjectCodec>> {
            (func_name == self.func_name).then(|| Arc::new(StubCodec) as Arc<dyn ObjectCodec>)
        }
    }

    // A loader stub serving one module under one path.
    struct StubLoader {
        module: &'static str,
        func_name: &'static str,
    }

    impl ModuleLoader for StubLoader {
        fn load(&self, module: &str) -> Result<Arc<dyn ProviderModule>> {
            if module != self.module {
                return Err(Error::NotFound);
            }
            Ok(Arc::new(StubModule {
                func_name: self.func_name,
            }))
        }
    }

    fn test_registry(func_name: &'static str) -> ProviderRegistry {
        ProviderRegistry::with_loader(Box::new(StubLoader {
            module: "provider.so",
            func_name,
        }))
    }

    // Tests registration bookkeeping: values stored, read back, updated and
    // removed.
    #[test]
    fn test_register_roundtrip() {
        let mut registry = test_registry(FUNC_ENCODE_OBJECT_EX);
        let ident = StructId::Oid("1.2.3.4".into());

        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("provider.so"),
                None,
            )
            .unwrap();
        assert_eq!(
            registry
                .get_value(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident, VALUE_MODULE)
                .unwrap(),
            Some("provider.so")
        );

        registry
            .set_value(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                VALUE_FUNC_NAME,
                "custom_entry",
            )
            .unwrap();
        assert_eq!(
            registry
                .get_value(
                    X509_ASN_ENCODING,
                    FUNC_ENCODE_OBJECT_EX,
                    &ident,
                    VALUE_FUNC_NAME
                )
                .unwrap(),
            Some("custom_entry")
        );

        registry
            .unregister(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
            .unwrap();
        match registry
            .unregister(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
            .unwrap_err()
        {
            Error::NotFound => {}
            other => panic!("Expected NotFound error, got {:?}", other),
        }
    }

    // Tests the no-op and invalid-parameter edges of registration.
    #[test]
    fn test_register_edges() {
        let mut registry = test_registry(FUNC_ENCODE_OBJECT_EX);
        let ident = StructId::Oid("1.2.3.4".into());

        // A message-only encoding type is a successful no-op
        registry
            .register(
                0x10000,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("provider.so"),
                None,
            )
            .unwrap();
        assert!(registry.entries().is_empty());

        // No module path is a successful no-op as well
        registry
            .register(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident, None, None)
            .unwrap();
        assert!(registry.entries().is_empty());

        // Empty key parts are invalid
        match registry
            .register(X509_ASN_ENCODING, "", &ident, Some("provider.so"), None)
            .unwrap_err()
        {
            Error::InvalidParameter => {}
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }
        match registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &StructId::Oid(String::new()),
                Some("provider.so"),
                None,
            )
            .unwrap_err()
        {
            Error::InvalidParameter => {}
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }
    }

    // Tests provider resolution: hit, entry-point override, and the failure
    // paths that must resolve to nothing.
    #[test]
    fn test_resolve() {
        let mut registry = test_registry(FUNC_ENCODE_OBJECT_EX);
        let ident = StructId::Oid("1.2.3.4".into());
        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("provider.so"),
                None,
            )
            .unwrap();

        let resolved = registry
            .resolve(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
            .unwrap();
        let mut buf = [0u8; 1];
        resolved
            .codec
            .encode(X509_ASN_ENCODING, &ident, &Value::Enumerated(0), Some(&mut buf))
            .unwrap();
        assert_eq!(buf[0], 0xa5);

        // Unknown identifier resolves to nothing
        assert!(
            registry
                .resolve(
                    X509_ASN_ENCODING,
                    FUNC_ENCODE_OBJECT_EX,
                    &StructId::Oid("9.9.9".into())
                )
                .is_none()
        );

        // The module resolving under an overridden name requires the
        // override to be registered
        let mut registry = test_registry("custom_entry");
        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("provider.so"),
                None,
            )
            .unwrap();
        assert!(
            registry
                .resolve(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
                .is_none()
        );
        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("provider.so"),
                Some("custom_entry"),
            )
            .unwrap();
        assert!(
            registry
                .resolve(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
                .is_some()
        );

        // A module that fails to load resolves to nothing
        let mut registry = test_registry(FUNC_ENCODE_OBJECT_EX);
        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("missing.so"),
                None,
            )
            .unwrap();
        assert!(
            registry
                .resolve(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
                .is_none()
        );

        // A registry without a loader never resolves
        let mut registry = ProviderRegistry::new();
        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &ident,
                Some("provider.so"),
                None,
            )
            .unwrap();
        assert!(
            registry
                .resolve(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &ident)
                .is_none()
        );
    }

    // Tests that integer identifiers key under their #NNNN form and entries
    // survive a persistence round-trip.
    #[test]
    fn test_key_names_and_persistence() {
        let mut registry = test_registry(FUNC_ENCODE_OBJECT_EX);
        registry
            .register(
                X509_ASN_ENCODING,
                FUNC_ENCODE_OBJECT_EX,
                &StructId::Tag(1234),
                Some("provider.so"),
                None,
            )
            .unwrap();
        assert!(
            registry
                .entries()
                .contains_key("EncodingType 1/encoder/#1234")
        );

        // The encoding type is not a mask: 3 only matches 3
        assert!(
            registry
                .resolve(3, FUNC_ENCODE_OBJECT_EX, &StructId::Tag(1234))
                .is_none()
        );

        let snapshot = registry.entries().clone();
        let mut restored = test_registry(FUNC_ENCODE_OBJECT_EX);
        restored.restore_entries(snapshot);
        assert!(
            restored
                .resolve(X509_ASN_ENCODING, FUNC_ENCODE_OBJECT_EX, &StructId::Tag(1234))
                .is_some()
        );
    }
}
