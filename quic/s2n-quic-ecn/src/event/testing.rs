// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Publishers and subscribers which record every event for assertions in tests

use super::{api, builder, IntoEvent};
use alloc::vec::Vec;

#[derive(Clone, Debug, Default)]
pub struct Publisher {
    pub ecn_state_changed: u32,
    events: Vec<api::EcnStateChanged>,
}

impl Publisher {
    /// Returns every event published so far, oldest first
    pub fn events(&self) -> &[api::EcnStateChanged] {
        &self.events
    }

    /// Returns the most recently published event
    pub fn last(&self) -> Option<&api::EcnStateChanged> {
        self.events.last()
    }
}

impl super::Publisher for Publisher {
    fn on_ecn_state_changed(&mut self, event: builder::EcnStateChanged) {
        self.ecn_state_changed += 1;
        self.events.push(event.into_event());
    }
}

#[derive(Clone, Debug, Default)]
pub struct Subscriber {
    pub ecn_state_changed: u32,
    events: Vec<(api::PathMeta, api::EcnStateChanged)>,
}

impl Subscriber {
    /// Returns every event received so far along with the path it was published for
    pub fn events(&self) -> &[(api::PathMeta, api::EcnStateChanged)] {
        &self.events
    }
}

impl super::Subscriber for Subscriber {
    type PathContext = ();

    fn create_path_context(&mut self, _meta: &api::PathMeta) -> Self::PathContext {}

    fn on_ecn_state_changed(
        &mut self,
        _context: &mut Self::PathContext,
        meta: &api::PathMeta,
        event: &api::EcnStateChanged,
    ) {
        self.ecn_state_changed += 1;
        self.events.push((meta.clone(), event.clone()));
    }
}
