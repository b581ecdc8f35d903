use crate::{entity::EntityId, events::Event};

/// A Message routed through the level.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The entity that sent this message.
    /// If None, then the Level sent the message.
    pub sender_entity_id: Option<EntityId>,

    /// The entity to which to route this Message.
    /// If None, the Level will process the message
    pub recipient_entity_id: Option<EntityId>,

    /// The event payload describing whatever happened
    pub event: Event,
}

impl Message {
    fn new(sender: Option<EntityId>, recipient: Option<EntityId>, event: Event) -> Self {
        Message {
            sender_entity_id: sender,
            recipient_entity_id: recipient,
            event,
        }
    }
}

pub trait MessageHandler {
    fn handle_message(&mut self, message: &Message);
}

pub struct Dispatcher {
    pub messages: Vec<Message>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher { messages: vec![] }
    }
}

impl Dispatcher {
    pub fn entity_to_global(&mut self, sender: EntityId, event: Event) {
        self.messages.push(Message::new(Some(sender), None, event));
    }

    pub fn global(&mut self, event: Event) {
        self.messages.push(Message::new(None, None, event));
    }

    pub fn dispatch(messages: &[Message], handler: &mut dyn MessageHandler) {
        for m in messages {
            handler.handle_message(m);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the current message buffer, and clears it.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

// ---------------------------------------------------------------------------------------------------------------------
