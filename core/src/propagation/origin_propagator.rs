// mercado/src/propagation/origin_propagator.rs

//! `ChangePropagator` over an [`Origin`]'s broadcast channel and storage events.

use crate::config::SyncConfig;
use crate::model::{CatalogSnapshot, Product};
use crate::propagation::listeners::ListenerRegistry;
use crate::propagation::origin::{ContextId, Origin};
use crate::propagation::{
  ChangePropagator, ChannelMessage, PropagatedUpdate, StorageEvent, Subscription, Transport, UpdateCallback,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Propagator owned by one execution context.
pub struct OriginPropagator {
  origin: Arc<Origin>,
  context: ContextId,
  channel: Option<Arc<ListenerRegistry<ChannelMessage>>>,
  storage_key: String,
}

// Same fields as the persisted snapshot, without cloning the products.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoragePayload<'a> {
  products: &'a [Product],
  last_updated: i64,
}

impl OriginPropagator {
  pub fn new(origin: Arc<Origin>, context: ContextId, config: &SyncConfig) -> Self {
    let channel = origin.open_channel(&config.channel_name);
    if channel.is_none() {
      event!(Level::WARN, %context, "Broadcast channel not available; relying on storage events only.");
    }
    Self {
      origin,
      context,
      channel,
      storage_key: config.storage_key.clone(),
    }
  }

  pub fn context(&self) -> ContextId {
    self.context
  }
}

impl ChangePropagator for OriginPropagator {
  #[instrument(
    name = "OriginPropagator::publish",
    skip_all,
    fields(context = %self.context, products = products.len(), timestamp = timestamp)
  )]
  fn publish(&self, products: &[Product], timestamp: i64) {
    if let Some(channel) = &self.channel {
      let message = ChannelMessage::ProductsUpdated {
        products: products.to_vec(),
        timestamp,
      };
      let delivered = channel.post(self.context, &message);
      event!(Level::DEBUG, delivered, "Broadcast channel update posted.");
    }

    match serde_json::to_string(&StoragePayload {
      products,
      last_updated: timestamp,
    }) {
      Ok(new_value) => {
        let storage_event = StorageEvent {
          key: self.storage_key.clone(),
          new_value: Some(new_value),
        };
        let delivered = self.origin.storage_events().post(self.context, &storage_event);
        event!(Level::DEBUG, delivered, "Storage event dispatched.");
      }
      Err(e) => event!(Level::ERROR, error = %e, "Failed to encode storage event payload."),
    }
  }

  fn subscribe(&self, callback: UpdateCallback) -> Subscription {
    let mut subscription = Subscription::new();

    if let Some(channel) = &self.channel {
      let on_message = Arc::clone(&callback);
      let listener_id = channel.add_listener(
        self.context,
        Arc::new(move |message: &ChannelMessage| match message {
          ChannelMessage::ProductsUpdated { products, timestamp } => on_message(PropagatedUpdate {
            products: products.clone(),
            timestamp: Some(*timestamp),
            via: Transport::BroadcastChannel,
          }),
        }),
      );
      let channel = Arc::clone(channel);
      subscription = subscription.on_unsubscribe(move || {
        channel.remove_listener(listener_id);
      });
    }

    let watched_key = self.storage_key.clone();
    let context = self.context;
    let listener_id = self.origin.storage_events().add_listener(
      self.context,
      Arc::new(move |storage_event: &StorageEvent| {
        if storage_event.key != watched_key {
          return;
        }
        let Some(raw) = storage_event.new_value.as_deref() else {
          return;
        };
        match CatalogSnapshot::decode(raw) {
          Ok(decoded) => callback(PropagatedUpdate {
            products: decoded.products,
            timestamp: decoded.last_updated,
            via: Transport::StorageEvent,
          }),
          Err(e) => event!(Level::ERROR, %context, error = %e, "Failed to parse storage event."),
        }
      }),
    );
    let origin = Arc::clone(&self.origin);
    subscription.on_unsubscribe(move || {
      origin.storage_events().remove_listener(listener_id);
    })
  }
}
