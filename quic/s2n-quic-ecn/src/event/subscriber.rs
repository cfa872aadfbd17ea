// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{api, builder, IntoEvent};

/// Allows applications to observe events emitted by the ECN controllers of their paths
///
/// Every method has a default no-op implementation, so a subscriber only
/// needs to implement the events it is interested in.
pub trait Subscriber: 'static + Send {
    /// Application-defined state attached to a single path
    type PathContext: 'static + Send;

    /// Creates the context for a newly created path
    fn create_path_context(&mut self, meta: &api::PathMeta) -> Self::PathContext;

    #[doc = "Called when the `EcnStateChanged` event is triggered"]
    #[inline]
    fn on_ecn_state_changed(
        &mut self,
        context: &mut Self::PathContext,
        meta: &api::PathMeta,
        event: &api::EcnStateChanged,
    ) {
        let _ = context;
        let _ = meta;
        let _ = event;
    }
}

impl<A, B> Subscriber for (A, B)
where
    A: Subscriber,
    B: Subscriber,
{
    type PathContext = (A::PathContext, B::PathContext);

    #[inline]
    fn create_path_context(&mut self, meta: &api::PathMeta) -> Self::PathContext {
        (
            self.0.create_path_context(meta),
            self.1.create_path_context(meta),
        )
    }

    #[inline]
    fn on_ecn_state_changed(
        &mut self,
        context: &mut Self::PathContext,
        meta: &api::PathMeta,
        event: &api::EcnStateChanged,
    ) {
        (self.0).on_ecn_state_changed(&mut context.0, meta, event);
        (self.1).on_ecn_state_changed(&mut context.1, meta, event);
    }
}

/// The interface through which the ECN controller reports its events
pub trait Publisher {
    #[doc = "Publishes a `EcnStateChanged` event to the publisher's subscriber"]
    fn on_ecn_state_changed(&mut self, event: builder::EcnStateChanged);
}

/// Publishes events for a single path to a [`Subscriber`]
pub struct PublisherSubscriber<'a, Sub: Subscriber> {
    meta: api::PathMeta,
    subscriber: &'a mut Sub,
    context: &'a mut Sub::PathContext,
}

impl<'a, Sub: Subscriber> PublisherSubscriber<'a, Sub> {
    #[inline]
    pub fn new(
        meta: builder::PathMeta,
        subscriber: &'a mut Sub,
        context: &'a mut Sub::PathContext,
    ) -> Self {
        Self {
            meta: meta.into_event(),
            subscriber,
            context,
        }
    }
}

impl<Sub: Subscriber> Publisher for PublisherSubscriber<'_, Sub> {
    #[inline]
    fn on_ecn_state_changed(&mut self, event: builder::EcnStateChanged) {
        let event = event.into_event();
        self.subscriber
            .on_ecn_state_changed(self.context, &self.meta, &event);
    }
}
