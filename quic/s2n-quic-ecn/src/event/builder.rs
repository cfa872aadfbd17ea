// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Event types as constructed by a [`Publisher`](super::Publisher)

use super::{api, IntoEvent};

#[derive(Clone, Debug)]
pub struct PathMeta {
    pub connection_id: u64,
    pub path_id: u64,
}

impl IntoEvent<api::PathMeta> for PathMeta {
    #[inline]
    fn into_event(self) -> api::PathMeta {
        let PathMeta {
            connection_id,
            path_id,
        } = self;
        api::PathMeta {
            connection_id: connection_id.into_event(),
            path_id: path_id.into_event(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcnState {
    Testing,
    Unknown,
    Failed,
    Capable,
}

impl IntoEvent<api::EcnState> for EcnState {
    #[inline]
    fn into_event(self) -> api::EcnState {
        use api::EcnState::*;
        match self {
            Self::Testing => Testing {},
            Self::Unknown => Unknown {},
            Self::Failed => Failed {},
            Self::Capable => Capable {},
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcnFailureReason {
    LostAllTestingPackets,
    MoreEcnCountsThanSent,
    DecreasedEcnCounts,
    NoEcnCounts,
    TooFewEcnCounts,
}

impl IntoEvent<api::EcnFailureReason> for EcnFailureReason {
    #[inline]
    fn into_event(self) -> api::EcnFailureReason {
        use api::EcnFailureReason::*;
        match self {
            Self::LostAllTestingPackets => LostAllTestingPackets {},
            Self::MoreEcnCountsThanSent => MoreEcnCountsThanSent {},
            Self::DecreasedEcnCounts => DecreasedEcnCounts {},
            Self::NoEcnCounts => NoEcnCounts {},
            Self::TooFewEcnCounts => TooFewEcnCounts {},
        }
    }
}

#[derive(Clone, Debug)]
pub struct EcnStateChanged {
    pub state: EcnState,
    pub reason: Option<EcnFailureReason>,
}

impl IntoEvent<api::EcnStateChanged> for EcnStateChanged {
    #[inline]
    fn into_event(self) -> api::EcnStateChanged {
        let EcnStateChanged { state, reason } = self;
        api::EcnStateChanged {
            state: state.into_event(),
            reason: reason.into_event(),
        }
    }
}
