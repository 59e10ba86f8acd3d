// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::{self, Write};
use std::rc::Rc;

use crate::error::IotError;

/// Identifier of a loadable module (driver or device detector).
///
/// Zero never identifies a real module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    /// Selector for "every module" where an operation accepts one.
    pub const ANY: Self = Self(0);
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the host a hardware device is physically attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HostId(pub u64);

/// Kind of connection a device is attached through (USB, serial line, GPIO block, ...).
/// Selects the [`IdentHandler`] interpreting address and hardware id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevConType(pub u16);

/// Identity of a locally attached hardware device as reported by a device detector.
///
/// `address` locates the device on its connection (port, bus path, ...), while `hwid`
/// describes what is plugged in there (vendor/product, serial, ...).
/// Both are opaque here and only interpreted by the [`IdentHandler`] of `contype`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HwDevIdent {
    pub contype: DevConType,
    pub detector_module_id: ModuleId,
    pub address: Vec<u8>,
    pub hwid: Vec<u8>,
}

/// Per-connection-type interpretation of [`HwDevIdent`]s.
pub trait IdentHandler {
    /// The connection type this handler is responsible for.
    fn contype(&self) -> DevConType;

    /// Returns `true` if `ident` is incomplete, i.e. a search pattern rather than the identity
    /// of a concrete device.
    fn is_template(&self, ident: &HwDevIdent) -> bool;

    /// Returns `true` if both identities point to the same device location.
    /// Hardware ids are not compared.
    fn matches_address(&self, a: &HwDevIdent, b: &HwDevIdent) -> bool;

    /// Returns `true` if the concrete identity `ident` satisfies `template`.
    fn matches(&self, ident: &HwDevIdent, template: &HwDevIdent) -> bool;

    /// Returns `true` if both identities describe the same hardware.
    fn matches_hwid(&self, a: &HwDevIdent, b: &HwDevIdent) -> bool;

    /// Returns a human-readable description for diagnostics.
    fn describe(&self, ident: &HwDevIdent) -> String;
}

/// Generic handler for connection types whose address and hardware id are plain byte strings.
///
/// An empty address or hardware id marks a template, and empty template fields act as
/// wildcards in [`matches`](IdentHandler::matches).
#[derive(Clone, Debug)]
pub struct ByteIdentHandler {
    contype: DevConType,
    name: &'static str,
}

impl ByteIdentHandler {
    pub const fn new(contype: DevConType, name: &'static str) -> Self {
        Self { contype, name }
    }
}

impl IdentHandler for ByteIdentHandler {
    fn contype(&self) -> DevConType {
        self.contype
    }

    fn is_template(&self, ident: &HwDevIdent) -> bool {
        ident.address.is_empty() || ident.hwid.is_empty()
    }

    fn matches_address(&self, a: &HwDevIdent, b: &HwDevIdent) -> bool {
        a.contype == b.contype && a.address == b.address
    }

    fn matches(&self, ident: &HwDevIdent, template: &HwDevIdent) -> bool {
        ident.contype == template.contype
            && (template.address.is_empty() || template.address == ident.address)
            && (template.hwid.is_empty() || template.hwid == ident.hwid)
    }

    fn matches_hwid(&self, a: &HwDevIdent, b: &HwDevIdent) -> bool {
        a.hwid == b.hwid
    }

    fn describe(&self, ident: &HwDevIdent) -> String {
        let mut s = String::with_capacity(self.name.len() + 4 * (ident.address.len() + ident.hwid.len()) + 16);
        s.push_str(self.name);
        s.push_str(" addr=");
        hex(&mut s, &ident.address);
        s.push_str(" hwid=");
        hex(&mut s, &ident.hwid);
        s
    }
}

fn hex(s: &mut String, bytes: &[u8]) {
    if bytes.is_empty() {
        s.push('*');
        return;
    }

    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            s.push(':');
        }
        let _ = write!(s, "{:02x}", b);
    }
}

/// Lookup table resolving a [`DevConType`] to its [`IdentHandler`].
#[derive(Clone, Default)]
pub struct HandlerTable {
    handlers: Vec<Rc<dyn IdentHandler>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handler for the connection type of `ident`, if one is registered.
    pub fn find_handler(&self, ident: &HwDevIdent) -> Option<Rc<dyn IdentHandler>> {
        self.handlers
            .iter()
            .find(|handler| handler.contype() == ident.contype)
            .cloned()
    }

    /// Adds a handler. Fails with [`IotError::InitedTwice`] if its connection type already has
    /// one.
    pub fn register(&mut self, handler: Rc<dyn IdentHandler>) -> Result<(), IotError> {
        if self.handlers.iter().any(|h| h.contype() == handler.contype()) {
            return Err(IotError::InitedTwice);
        }

        self.handlers.push(handler);
        Ok(())
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.contype()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USB: DevConType = DevConType(1);

    fn ident(address: &[u8], hwid: &[u8]) -> HwDevIdent {
        HwDevIdent {
            contype: USB,
            detector_module_id: ModuleId(7),
            address: address.to_vec(),
            hwid: hwid.to_vec(),
        }
    }

    #[test]
    fn byte_handler_matching() {
        let handler = ByteIdentHandler::new(USB, "usb");
        let a = ident(&[1, 2], &[0xab]);
        let b = ident(&[1, 2], &[0xcd]);

        assert!(handler.matches_address(&a, &b));
        assert!(!handler.matches_hwid(&a, &b));
        assert!(handler.matches(&a, &ident(&[], &[0xab])));
        assert!(!handler.matches(&b, &ident(&[], &[0xab])));
        assert!(handler.is_template(&ident(&[1], &[])));
        assert!(!handler.is_template(&a));
        assert_eq!(handler.describe(&a), "usb addr=01:02 hwid=ab");
    }

    #[test]
    fn table_rejects_duplicate_contype() {
        let mut table = HandlerTable::new();
        table
            .register(Rc::new(ByteIdentHandler::new(USB, "usb")))
            .unwrap();

        assert_eq!(
            table.register(Rc::new(ByteIdentHandler::new(USB, "usb2"))),
            Err(IotError::InitedTwice)
        );
        assert!(table.find_handler(&ident(&[1], &[1])).is_some());
        assert!(table
            .find_handler(&HwDevIdent {
                contype: DevConType(2),
                ..ident(&[1], &[1])
            })
            .is_none());
    }
}
