// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    event::{self, builder},
    frame::ack::EcnCounts,
    inet::ExplicitCongestionNotification,
    packet::number::PacketNumber,
};
use smallvec::SmallVec;

mod config;
mod marked;

pub use config::{Config, ValidationError, TESTING_PACKET_THRESHOLD};
use marked::MarkedPackets;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// ECN capability is being tested, tracking the number of ECN marked packets sent
    Testing(u8),
    /// ECN capability has been tested, but not validated yet
    Unknown,
    /// ECN validation has succeeded
    Capable,
    /// ECN validation has failed. This state is never left.
    Failed,
}

impl State {
    #[inline]
    fn as_event(self) -> builder::EcnState {
        match self {
            Self::Testing(_) => builder::EcnState::Testing,
            Self::Unknown => builder::EcnState::Unknown,
            Self::Capable => builder::EcnState::Capable,
            Self::Failed => builder::EcnState::Failed,
        }
    }
}

/// Validates that ECN markings are preserved on a single path
#[derive(Clone, Debug)]
pub struct Controller {
    state: State,
    config: Config,
    // Testing packets that have been neither acknowledged nor declared lost
    testing_packets: SmallVec<[PacketNumber; TESTING_PACKET_THRESHOLD as usize]>,
    // ECT marked packets that have been neither acknowledged nor declared lost
    marked_packets: MarkedPackets,
    // Total ECN counts for all packets sent on the path
    sent_ecn_counts: EcnCounts,
    // The ECN counts of the last ACK frame that passed validation
    baseline_ecn_counts: EcnCounts,
}

impl Default for Controller {
    fn default() -> Self {
        Controller::new()
    }
}

impl Controller {
    /// Construct a new ecn::Controller in the `Testing` state.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            state: State::Testing(0),
            config,
            testing_packets: SmallVec::new(),
            marked_packets: MarkedPackets::default(),
            sent_ecn_counts: EcnCounts::default(),
            baseline_ecn_counts: EcnCounts::default(),
        }
    }

    /// Gets the ECN marking to use on the next packet sent to the peer
    #[inline]
    pub fn ecn(&self) -> ExplicitCongestionNotification {
        match self.state {
            //= https://www.rfc-editor.org/rfc/rfc9000#appendix-A.4
            //# On paths with a "testing" or "capable" state, the endpoint
            //# sends packets with an ECT marking -- ECT(0) by default;
            //# otherwise, the endpoint sends unmarked packets.
            State::Testing(_) | State::Capable => ExplicitCongestionNotification::Ect0,
            State::Unknown | State::Failed => ExplicitCongestionNotification::NotEct,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns true if the path has been determined to be capable of handling ECN marked packets
    #[inline]
    pub fn is_capable(&self) -> bool {
        matches!(self.state, State::Capable)
    }

    /// Returns true if ECN has been disabled on the path
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The number of packets sent with each ECT codepoint
    #[inline]
    pub fn sent_ecn_counts(&self) -> EcnCounts {
        self.sent_ecn_counts
    }

    /// The ECN counts of the most recent ACK frame that passed validation
    #[inline]
    pub fn baseline_ecn_counts(&self) -> EcnCounts {
        self.baseline_ecn_counts
    }

    /// This method gets called when a packet has been sent
    pub fn on_packet_sent<Pub: event::Publisher>(
        &mut self,
        packet_number: PacketNumber,
        ecn: ExplicitCongestionNotification,
        publisher: &mut Pub,
    ) {
        if self.is_failed() || !ecn.is_ect() {
            // Endpoints never mark packets as CE, so those aren't counted either
            return;
        }

        self.sent_ecn_counts.increment(ecn);
        self.marked_packets.insert(packet_number);

        if let State::Testing(packet_count) = self.state {
            if packet_count == 0 {
                publisher.on_ecn_state_changed(builder::EcnStateChanged {
                    state: builder::EcnState::Testing,
                    reason: None,
                });
            }

            if !self.testing_packets.contains(&packet_number) {
                self.testing_packets.push(packet_number);
            }

            let packet_count = packet_count + 1;
            if packet_count >= self.config.testing_packet_threshold() {
                self.transition(State::Unknown, None, publisher);
            } else {
                self.state = State::Testing(packet_count);
            }
        }
    }

    /// This method gets called when a packet loss is reported
    pub fn on_packet_loss<Pub: event::Publisher>(
        &mut self,
        packet_number: PacketNumber,
        publisher: &mut Pub,
    ) {
        self.marked_packets.remove(packet_number);

        if !self.remove_testing_packet(packet_number) {
            return;
        }

        if self.testing_packets.is_empty()
            && matches!(self.state, State::Testing(_) | State::Unknown)
        {
            // None of the testing packets made it to the peer, so the path
            // may be dropping ECN marked packets.
            self.fail(builder::EcnFailureReason::LostAllTestingPackets, publisher);
        }
    }

    //= https://www.rfc-editor.org/rfc/rfc9000#section-13.4.2.2
    //# Network routing and path elements can change mid-connection; an endpoint
    //# MUST disable ECN if validation later fails.
    /// This method gets called when an ACK frame newly acknowledges packets
    ///
    /// * `newly_acked` - the packets acknowledged for the first time by this ACK frame
    /// * `ack_frame_ecn_counts` - the cumulative ECN counts reported in the ACK frame
    ///
    /// Returns true if the peer reported an increase in CE marked packets.
    pub fn on_packets_acked<I, Pub>(
        &mut self,
        newly_acked: I,
        ack_frame_ecn_counts: EcnCounts,
        publisher: &mut Pub,
    ) -> bool
    where
        I: IntoIterator<Item = PacketNumber>,
        Pub: event::Publisher,
    {
        let mut newly_acked_ecn_packets = 0u64;
        for packet_number in newly_acked {
            // an acknowledged packet can't be declared lost later
            self.remove_testing_packet(packet_number);

            if self.marked_packets.remove(packet_number) {
                newly_acked_ecn_packets += 1;
            }
        }

        if self.is_failed() {
            // Validation had already failed
            return false;
        }

        if newly_acked_ecn_packets == 0 {
            // Nothing to validate
            return false;
        }

        if let Err(reason) = self.validate(newly_acked_ecn_packets, ack_frame_ecn_counts) {
            self.fail(reason, publisher);
            return false;
        }

        let congestion_experienced =
            ack_frame_ecn_counts.ce_count > self.baseline_ecn_counts.ce_count;
        self.baseline_ecn_counts = ack_frame_ecn_counts;

        //= https://www.rfc-editor.org/rfc/rfc9000#section-13.4.2.2
        //# Upon successful validation, an endpoint MAY continue to set an ECT
        //# codepoint in subsequent packets it sends, with the expectation that
        //# the path is ECN-capable.
        if !self.is_capable() {
            self.testing_packets.clear();
            self.transition(State::Capable, None, publisher);
        }

        congestion_experienced
    }

    /// Validates the ECN counts of an ACK frame that newly acknowledged
    /// `newly_acked_ecn_packets` packets sent with an ECT marking
    fn validate(
        &self,
        newly_acked_ecn_packets: u64,
        ack_frame_ecn_counts: EcnCounts,
    ) -> Result<(), builder::EcnFailureReason> {
        //= https://www.rfc-editor.org/rfc/rfc9000#section-13.4.2.1
        //# ECN validation can fail if the received total count for either ECT(0) or ECT(1)
        //# exceeds the total number of packets sent with each corresponding ECT codepoint.
        if ack_frame_ecn_counts.ect_0_count > self.sent_ecn_counts.ect_0_count
            || ack_frame_ecn_counts.ect_1_count > self.sent_ecn_counts.ect_1_count
        {
            return Err(builder::EcnFailureReason::MoreEcnCountsThanSent);
        }

        // The counts are cumulative, so they can never go below what was already accepted
        let incremental_ecn_counts = ack_frame_ecn_counts
            .checked_sub(self.baseline_ecn_counts)
            .ok_or(builder::EcnFailureReason::DecreasedEcnCounts)?;

        //= https://www.rfc-editor.org/rfc/rfc9000#section-13.4.2.1
        //# If an ACK frame newly acknowledges a packet that the endpoint sent with
        //# either the ECT(0) or ECT(1) codepoint set, ECN validation fails if the
        //# corresponding ECN counts are not present in the ACK frame.
        if ack_frame_ecn_counts.as_option().is_none() {
            return Err(builder::EcnFailureReason::NoEcnCounts);
        }

        // ACK frames may be lost or reordered, so an increase beyond the number
        // of newly acknowledged packets is accepted.
        if incremental_ecn_counts.total() < newly_acked_ecn_packets {
            return Err(builder::EcnFailureReason::TooFewEcnCounts);
        }

        Ok(())
    }

    /// Removes the packet from the outstanding testing packets, returning true if it was present
    #[inline]
    fn remove_testing_packet(&mut self, packet_number: PacketNumber) -> bool {
        if let Some(index) = self
            .testing_packets
            .iter()
            .position(|pn| *pn == packet_number)
        {
            self.testing_packets.swap_remove(index);
            true
        } else {
            false
        }
    }

    //= https://www.rfc-editor.org/rfc/rfc9000#section-13.4.2.2
    //# If validation fails, then the endpoint MUST disable ECN. It stops setting the ECT
    //# codepoint in IP packets that it sends, assuming that either the network path or
    //# the peer does not support ECN.
    fn fail<Pub: event::Publisher>(
        &mut self,
        reason: builder::EcnFailureReason,
        publisher: &mut Pub,
    ) {
        debug_assert!(!self.is_failed());

        self.testing_packets.clear();
        self.marked_packets.clear();
        self.transition(State::Failed, Some(reason), publisher);
    }

    #[inline]
    fn transition<Pub: event::Publisher>(
        &mut self,
        state: State,
        reason: Option<builder::EcnFailureReason>,
        publisher: &mut Pub,
    ) {
        self.state = state;
        publisher.on_ecn_state_changed(builder::EcnStateChanged {
            state: state.as_event(),
            reason,
        });
    }
}

#[cfg(test)]
mod fuzz_target;
