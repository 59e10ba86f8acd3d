// Copyright 2022 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::clock::{Clock, ManualClock, Timestamp};
use crate::config::RegistryConfig;
use crate::driver::{DeviceConnection, DriverInstance, DriverModule, ModuleRegistry, ReleaseHandle};
use crate::error::IotError;
use crate::ident::{ByteIdentHandler, DevConType, HandlerTable, HostId, HwDevIdent, ModuleId};
use crate::record::{HwDevRecord, RecordId};
use crate::registry::{ActionOutcome, HwDevAction, HwDevRegistry};

pub const USB: DevConType = DevConType(1);
pub const HOST: HostId = HostId(0x1234);

pub fn registry() -> (HwDevRegistry<ManualClock>, ManualClock) {
    let mut handlers = HandlerTable::new();
    handlers
        .register(Rc::new(ByteIdentHandler::new(USB, "usb")))
        .unwrap();

    let clock = ManualClock::new();
    let registry = HwDevRegistry::with_clock(RegistryConfig::new(HOST), handlers, clock.clone());
    (registry, clock)
}

pub fn registry_now<C: Clock>(registry: &HwDevRegistry<C>) -> Timestamp {
    registry.clock.now()
}

pub fn ident(address: &[u8], hwid: &[u8]) -> HwDevIdent {
    HwDevIdent {
        contype: USB,
        detector_module_id: ModuleId(1),
        address: address.to_vec(),
        hwid: hwid.to_vec(),
    }
}

/// Adds a device without any driver module around.
pub fn add_plain<C: Clock>(registry: &mut HwDevRegistry<C>, address: &[u8]) -> RecordId {
    let outcome = registry.apply_action(
        HwDevAction::Add,
        &ident(address, &[1]),
        &[],
        &mut MockModules::empty(),
    );

    match outcome {
        ActionOutcome::Added(id) => id,
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[derive(Debug, Default)]
pub struct MockInstance {
    pub stopped: Cell<Option<bool>>,
    pub working: Cell<bool>,
}

impl MockInstance {
    pub fn working() -> Rc<Self> {
        Rc::new(Self {
            stopped: Cell::new(None),
            working: Cell::new(true),
        })
    }
}

impl DriverInstance for MockInstance {
    fn stop(&self, graceful: bool) {
        self.stopped.set(Some(graceful));
        self.working.set(false);
    }

    fn is_working_not_stopping(&self) -> bool {
        self.working.get()
    }
}

/// Driver module answering from a script, then with `default`.
pub struct MockModule {
    pub id: ModuleId,
    pub script: VecDeque<Result<(), IotError>>,
    pub default: Result<(), IotError>,
    pub calls: Vec<RecordId>,
    pub instances: Vec<Rc<MockInstance>>,
    /// Handles of every attempt, failed ones included.
    pub releases: Vec<ReleaseHandle>,
}

impl MockModule {
    pub fn new(id: ModuleId, default: Result<(), IotError>) -> Self {
        Self {
            id,
            script: VecDeque::new(),
            default,
            calls: Vec::new(),
            instances: Vec::new(),
            releases: Vec::new(),
        }
    }

    pub fn then(mut self, result: Result<(), IotError>) -> Self {
        self.script.push_back(result);
        self
    }
}

impl DriverModule for MockModule {
    fn module_id(&self) -> ModuleId {
        self.id
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn try_driver_create(
        &mut self,
        record: &HwDevRecord,
        release: ReleaseHandle,
    ) -> Result<Rc<dyn DriverInstance>, IotError> {
        assert!(!record.is_bound());
        self.calls.push(release.record());
        self.releases.push(release);

        self.script.pop_front().unwrap_or(self.default)?;

        let instance = MockInstance::working();
        self.instances.push(Rc::clone(&instance));
        Ok(instance)
    }
}

pub struct MockModules {
    pub modules: Vec<MockModule>,
}

impl MockModules {
    pub fn new(modules: Vec<MockModule>) -> Self {
        Self { modules }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl ModuleRegistry for MockModules {
    fn ready_driver_modules(&mut self) -> Vec<&mut dyn DriverModule> {
        self.modules
            .iter_mut()
            .map(|module| module as &mut dyn DriverModule)
            .collect()
    }
}

/// Local connection answering from a script, then with `default`.
pub struct MockConnection {
    pub initial: bool,
    pub script: VecDeque<Result<(), IotError>>,
    pub default: Result<(), IotError>,
    pub attempts: usize,
}

impl MockConnection {
    pub fn new(default: Result<(), IotError>) -> Self {
        Self {
            initial: true,
            script: VecDeque::new(),
            default,
            attempts: 0,
        }
    }

    pub fn then(mut self, result: Result<(), IotError>) -> Self {
        self.script.push_back(result);
        self
    }
}

impl DeviceConnection for MockConnection {
    fn is_initial(&self) -> bool {
        self.initial
    }

    fn connect_local(&mut self, _instance: &Rc<dyn DriverInstance>) -> Result<(), IotError> {
        self.attempts += 1;
        self.script.pop_front().unwrap_or(self.default)
    }
}
