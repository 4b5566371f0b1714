use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    contacts::{ContactRegistry, EmergencyContact},
    controller::{Controller, ControllerParts},
    core::Config,
    dispatch::{DispatchService, SenderRef, SimulatedSender},
    events::Bus,
    location::{LocationRef, NoLocation},
    subscribers::{Subscribe, SubscriberSet},
};

use super::workflow::AlertWorkflow;

/// Builder for constructing an [`AlertWorkflow`] with its collaborators.
pub struct WorkflowBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    contacts: Option<Arc<ContactRegistry>>,
    location: Option<LocationRef>,
    sender: Option<SenderRef>,
}

impl WorkflowBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            contacts: None,
            location: None,
            sender: None,
        }
    }

    /// Sets event subscribers (toasts, logging, custom).
    ///
    /// Subscribers receive workflow events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Seeds a fresh contact registry (duplicate ids keep the first entry).
    pub fn with_contacts(mut self, contacts: Vec<EmergencyContact>) -> Self {
        self.contacts = Some(Arc::new(ContactRegistry::with_contacts(contacts)));
        self
    }

    /// Shares an existing registry with the profile collaborator.
    pub fn with_registry(mut self, registry: Arc<ContactRegistry>) -> Self {
        self.contacts = Some(registry);
        self
    }

    /// Sets the location provider (default: [`NoLocation`]).
    pub fn with_location(mut self, provider: LocationRef) -> Self {
        self.location = Some(provider);
        self
    }

    /// Sets the per-contact transport (default: [`SimulatedSender`]).
    pub fn with_sender(mut self, sender: SenderRef) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Builds the workflow and spawns its tasks.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> AlertWorkflow {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let token = CancellationToken::new();

        let contacts = self.contacts.unwrap_or_default();
        let location = self.location.unwrap_or_else(|| Arc::new(NoLocation));
        let sender = self.sender.unwrap_or_else(|| Arc::new(SimulatedSender));
        let dispatch = Arc::new(DispatchService::new(
            sender,
            bus.clone(),
            self.cfg.delivery_timeout(),
        )
        .with_ledger_capacity(self.cfg.ledger_capacity_clamped()));

        let (handle, controller) = Controller::spawn(
            ControllerParts {
                cfg: self.cfg.clone(),
                bus: bus.clone(),
                contacts: Arc::clone(&contacts),
                location,
                dispatch,
            },
            token.clone(),
        );

        AlertWorkflow::new_internal(self.cfg, bus, contacts, subs, handle, controller, token)
    }
}
