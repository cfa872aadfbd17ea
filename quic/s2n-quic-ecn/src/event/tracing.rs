// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Emits events through the `tracing` crate

use super::api;

#[derive(Clone, Debug)]
pub struct Subscriber {
    root: ::tracing::Span,
}

impl Default for Subscriber {
    fn default() -> Self {
        let root = ::tracing::span!(target: "s2n_quic", ::tracing::Level::DEBUG, "s2n_quic");
        Self { root }
    }
}

impl super::Subscriber for Subscriber {
    type PathContext = ::tracing::Span;

    fn create_path_context(&mut self, meta: &api::PathMeta) -> Self::PathContext {
        ::tracing::span!(
            target: "s2n_quic",
            parent: self.root.id(),
            ::tracing::Level::DEBUG,
            "path",
            connection_id = meta.connection_id,
            path_id = meta.path_id
        )
    }

    #[inline]
    fn on_ecn_state_changed(
        &mut self,
        context: &mut Self::PathContext,
        _meta: &api::PathMeta,
        event: &api::EcnStateChanged,
    ) {
        let id = context.id();
        let api::EcnStateChanged { state, reason } = event;
        ::tracing::event!(
            target: "ecn_state_changed",
            parent: id,
            ::tracing::Level::DEBUG,
            state = ::tracing::field::debug(state),
            reason = ::tracing::field::debug(reason)
        );
    }
}
