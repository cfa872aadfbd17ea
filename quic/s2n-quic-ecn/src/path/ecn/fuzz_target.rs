// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::event::testing::Publisher;
use alloc::collections::{BTreeMap, BTreeSet};
use bolero::{check, generator::*};

/// A direct implementation of the validation rules, keeping the marking of every sent packet
#[derive(Debug)]
struct Oracle {
    threshold: u8,
    state: Option<State>,
    testing_packets: BTreeSet<u64>,
    sent_marks: BTreeMap<u64, ExplicitCongestionNotification>,
    sent: EcnCounts,
    baseline: EcnCounts,
    events: u32,
}

impl Oracle {
    fn new(threshold: u8) -> Self {
        Self {
            threshold,
            state: None,
            testing_packets: BTreeSet::new(),
            sent_marks: BTreeMap::new(),
            sent: EcnCounts::default(),
            baseline: EcnCounts::default(),
            events: 0,
        }
    }

    fn state(&self) -> State {
        self.state.unwrap_or(State::Testing(0))
    }

    fn ecn(&self) -> ExplicitCongestionNotification {
        match self.state() {
            State::Testing(_) | State::Capable => ExplicitCongestionNotification::Ect0,
            _ => ExplicitCongestionNotification::NotEct,
        }
    }

    fn on_packet_sent(&mut self, packet_number: u64, ecn: ExplicitCongestionNotification) {
        if self.state() == State::Failed || !ecn.is_ect() {
            return;
        }

        self.sent.increment(ecn);
        self.sent_marks.insert(packet_number, ecn);

        if let State::Testing(count) = self.state() {
            if count == 0 {
                self.events += 1;
            }
            self.testing_packets.insert(packet_number);

            if count + 1 == self.threshold {
                self.state = Some(State::Unknown);
                self.events += 1;
            } else {
                self.state = Some(State::Testing(count + 1));
            }
        }
    }

    fn on_packet_loss(&mut self, packet_number: u64) {
        self.sent_marks.remove(&packet_number);

        if self.testing_packets.remove(&packet_number)
            && self.testing_packets.is_empty()
            && matches!(self.state(), State::Testing(_) | State::Unknown)
        {
            self.fail();
        }
    }

    fn on_packets_acked(&mut self, packet_numbers: &[u64], counts: EcnCounts) -> bool {
        let mut newly_acked_ecn_packets = 0u128;
        for packet_number in packet_numbers {
            self.testing_packets.remove(packet_number);
            if self.sent_marks.remove(packet_number).is_some() {
                newly_acked_ecn_packets += 1;
            }
        }

        if self.state() == State::Failed {
            return false;
        }

        if newly_acked_ecn_packets == 0 {
            return false;
        }

        if counts.ect_0_count > self.sent.ect_0_count
            || counts.ect_1_count > self.sent.ect_1_count
            || counts.ect_0_count < self.baseline.ect_0_count
            || counts.ect_1_count < self.baseline.ect_1_count
            || counts.ce_count < self.baseline.ce_count
            || counts == EcnCounts::default()
        {
            self.fail();
            return false;
        }

        let sum = |counts: &EcnCounts| {
            counts.ect_0_count as u128 + counts.ect_1_count as u128 + counts.ce_count as u128
        };
        if sum(&counts) - sum(&self.baseline) < newly_acked_ecn_packets {
            self.fail();
            return false;
        }

        let congestion_experienced = counts.ce_count > self.baseline.ce_count;
        self.baseline = counts;
        if self.state() != State::Capable {
            self.state = Some(State::Capable);
            self.events += 1;
        }
        congestion_experienced
    }

    fn fail(&mut self) {
        self.state = Some(State::Failed);
        self.testing_packets.clear();
        self.events += 1;
    }
}

#[derive(Clone, Copy, Debug, TypeGenerator)]
enum Report {
    /// Reports exactly the markings of the newly acknowledged packets
    Accurate { congested: bool },
    /// Adjusts each accurate counter by the given amount
    Skewed { ect_0: i8, ect_1: i8, ce: i8 },
    /// Reports arbitrary counts
    Arbitrary { ect_0: u8, ect_1: u8, ce: u8 },
}

#[derive(Clone, Copy, Debug, TypeGenerator)]
enum Operation {
    /// Sends a packet with the marking chosen by the controller
    Send,
    /// Sends a packet with an explicit marking
    SendWith { ecn: ExplicitCongestionNotification },
    /// Declares a previously sent packet lost, which may have already been resolved
    Lose { index: u8 },
    /// Acknowledges a range of the packets still in flight
    Ack { skip: u8, count: u8, report: Report },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    InFlight,
    Acked,
    Lost,
}

struct Model {
    subject: Controller,
    oracle: Oracle,
    publisher: Publisher,
    packets: Vec<(u64, Status)>,
    previous_state: State,
}

impl Model {
    fn new(threshold: u8) -> Self {
        let config = Config::new().with_testing_packet_threshold(threshold).unwrap();

        Self {
            subject: Controller::with_config(config),
            oracle: Oracle::new(threshold),
            publisher: Publisher::default(),
            packets: Vec::new(),
            previous_state: State::Testing(0),
        }
    }

    fn apply(&mut self, operation: &Operation) {
        match *operation {
            Operation::Send => self.send(self.subject.ecn()),
            Operation::SendWith { ecn } => self.send(ecn),
            Operation::Lose { index } => self.lose(index),
            Operation::Ack {
                skip,
                count,
                report,
            } => self.ack(skip, count, report),
        }

        self.invariants();
    }

    fn send(&mut self, ecn: ExplicitCongestionNotification) {
        let packet_number = self.packets.len() as u64;
        self.packets.push((packet_number, Status::InFlight));

        self.subject
            .on_packet_sent(PacketNumber::new(packet_number), ecn, &mut self.publisher);
        self.oracle.on_packet_sent(packet_number, ecn);
    }

    fn lose(&mut self, index: u8) {
        if self.packets.is_empty() {
            return;
        }

        let index = index as usize % self.packets.len();
        let (packet_number, status) = &mut self.packets[index];
        if *status == Status::InFlight {
            *status = Status::Lost;
        }
        let packet_number = *packet_number;

        self.subject
            .on_packet_loss(PacketNumber::new(packet_number), &mut self.publisher);
        self.oracle.on_packet_loss(packet_number);
    }

    fn ack(&mut self, skip: u8, count: u8, report: Report) {
        let in_flight: Vec<u64> = self
            .packets
            .iter()
            .filter(|(_, status)| *status == Status::InFlight)
            .map(|(packet_number, _)| *packet_number)
            .collect();

        if in_flight.is_empty() {
            return;
        }

        let skip = skip as usize % in_flight.len();
        let count = count as usize % 8 + 1;
        let newly_acked: Vec<u64> = in_flight.into_iter().skip(skip).take(count).collect();

        for (packet_number, status) in self.packets.iter_mut() {
            if newly_acked.contains(packet_number) {
                *status = Status::Acked;
            }
        }

        let counts = self.report(&newly_acked, report);

        let expected = self.oracle.on_packets_acked(&newly_acked, counts);
        let actual = self.subject.on_packets_acked(
            newly_acked.iter().copied().map(PacketNumber::new),
            counts,
            &mut self.publisher,
        );
        assert_eq!(expected, actual);
    }

    fn report(&self, newly_acked: &[u64], report: Report) -> EcnCounts {
        // must be called before the oracle resolves `newly_acked`
        let mut accurate = self.oracle.baseline;
        for packet_number in newly_acked {
            if let Some(ecn) = self.oracle.sent_marks.get(packet_number) {
                accurate.increment(*ecn);
            }
        }

        match report {
            Report::Accurate { congested } => {
                if congested && accurate.ect_0_count > self.oracle.baseline.ect_0_count {
                    accurate.ect_0_count -= 1;
                    accurate.ce_count += 1;
                }
                accurate
            }
            Report::Skewed { ect_0, ect_1, ce } => EcnCounts::new(
                accurate.ect_0_count.saturating_add_signed(ect_0 as i64),
                accurate.ect_1_count.saturating_add_signed(ect_1 as i64),
                accurate.ce_count.saturating_add_signed(ce as i64),
            ),
            Report::Arbitrary { ect_0, ect_1, ce } => {
                EcnCounts::new(ect_0 as u64, ect_1 as u64, ce as u64)
            }
        }
    }

    fn invariants(&mut self) {
        let state = self.subject.state();

        assert_eq!(self.oracle.state(), state);
        assert_eq!(self.oracle.ecn(), self.subject.ecn());
        assert_eq!(self.oracle.events, self.publisher.ecn_state_changed);
        assert_eq!(self.oracle.sent, self.subject.sent_ecn_counts());
        assert_eq!(self.oracle.baseline, self.subject.baseline_ecn_counts());

        // transitions only move forward
        let rank = |state: State| match state {
            State::Testing(_) => 0,
            State::Unknown => 1,
            State::Capable => 2,
            State::Failed => 3,
        };
        assert!(rank(self.previous_state) <= rank(state));
        self.previous_state = state;

        assert!(self.subject.testing_packets.len() <= self.oracle.threshold as usize);
        // only unresolved marked packets are tracked
        assert!(self.subject.marked_packets.interval_len() <= self.oracle.sent_marks.len());
        if matches!(state, State::Testing(_) | State::Unknown) {
            assert_eq!(
                self.oracle.testing_packets.len(),
                self.subject.testing_packets.len()
            );
        }

        if state != State::Failed {
            let sent = self.subject.sent_ecn_counts();
            let baseline = self.subject.baseline_ecn_counts();
            assert!(sent.ect_0_count >= baseline.ect_0_count);
            assert!(sent.ect_1_count >= baseline.ect_1_count);
        }

        // a failure is only ever reported together with its reason
        if let Some(event) = self.publisher.last() {
            assert_eq!(
                matches!(event.state, crate::event::api::EcnState::Failed {}),
                event.reason.is_some()
            );
        }
    }
}

#[test]
fn ecn_controller_fuzz() {
    check!()
        .with_type::<(u8, Vec<Operation>)>()
        .for_each(|(threshold, operations)| {
            // cover thresholds on both sides of the default
            let threshold = threshold % (TESTING_PACKET_THRESHOLD * 2) + 1;
            let mut model = Model::new(threshold);

            for operation in operations.iter() {
                model.apply(operation);
            }
        });
}
