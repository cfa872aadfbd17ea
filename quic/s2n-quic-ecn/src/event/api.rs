// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Event types as observed by a [`Subscriber`](super::Subscriber)

use super::Event;

#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct PathMeta {
    pub connection_id: u64,
    pub path_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
/// The current state of the ECN controller for the path
pub enum EcnState {
    #[non_exhaustive]
    Testing {},
    #[non_exhaustive]
    Unknown {},
    #[non_exhaustive]
    Failed {},
    #[non_exhaustive]
    Capable {},
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
/// The reason ECN validation failed on a path
pub enum EcnFailureReason {
    #[non_exhaustive]
    /// Every packet sent while testing was declared lost
    LostAllTestingPackets {},
    #[non_exhaustive]
    /// The peer reported more ECT(0) or ECT(1) marks than were sent
    MoreEcnCountsThanSent {},
    #[non_exhaustive]
    /// A reported counter was lower than in a previously accepted ACK
    DecreasedEcnCounts {},
    #[non_exhaustive]
    /// ECN-marked packets were acknowledged without any ECN counts
    NoEcnCounts {},
    #[non_exhaustive]
    /// The counters increased by less than the number of newly acknowledged ECN-marked packets
    TooFewEcnCounts {},
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct EcnStateChanged {
    pub state: EcnState,
    /// Only set when `state` is `Failed`
    pub reason: Option<EcnFailureReason>,
}

impl Event for EcnStateChanged {
    const NAME: &'static str = "recovery:ecn_state_changed";
}
