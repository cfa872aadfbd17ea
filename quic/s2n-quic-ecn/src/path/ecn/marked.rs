// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::packet::number::PacketNumber;
use alloc::vec::Vec;

/// An inclusive range of packet numbers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Interval {
    start: u64,
    end: u64,
}

/// The set of packet numbers that were sent with an ECT codepoint and are
/// still awaiting acknowledgement or loss
///
/// Consecutive packet numbers are stored as a single interval. Packet numbers
/// are removed once they are resolved, so the set is bounded by the packets
/// in flight rather than by the lifetime of the path.
#[derive(Clone, Debug, Default)]
pub(super) struct MarkedPackets {
    intervals: Vec<Interval>,
}

impl MarkedPackets {
    pub fn insert(&mut self, packet_number: PacketNumber) {
        let value = packet_number.as_u64();

        // index of the first interval that ends at or after `value`
        let index = self.intervals.partition_point(|interval| interval.end < value);

        if let Some(interval) = self.intervals.get(index) {
            if interval.start <= value {
                return;
            }
        }

        // `value` falls strictly between the previous and next intervals
        let extends_prev = index
            .checked_sub(1)
            .map_or(false, |prev| self.intervals[prev].end + 1 == value);
        let extends_next = self
            .intervals
            .get(index)
            .map_or(false, |next| value + 1 == next.start);

        match (extends_prev, extends_next) {
            (true, true) => {
                self.intervals[index - 1].end = self.intervals[index].end;
                self.intervals.remove(index);
            }
            (true, false) => self.intervals[index - 1].end = value,
            (false, true) => self.intervals[index].start = value,
            (false, false) => self.intervals.insert(
                index,
                Interval {
                    start: value,
                    end: value,
                },
            ),
        }
    }

    #[cfg(test)]
    pub fn contains(&self, packet_number: PacketNumber) -> bool {
        let value = packet_number.as_u64();
        let index = self.intervals.partition_point(|interval| interval.end < value);
        self.intervals
            .get(index)
            .map_or(false, |interval| interval.start <= value)
    }

    /// Removes the packet number, returning true if it was present
    pub fn remove(&mut self, packet_number: PacketNumber) -> bool {
        let value = packet_number.as_u64();
        let index = self.intervals.partition_point(|interval| interval.end < value);

        let interval = match self.intervals.get_mut(index) {
            Some(interval) if interval.start <= value => interval,
            _ => return false,
        };

        match (interval.start == value, interval.end == value) {
            (true, true) => {
                self.intervals.remove(index);
            }
            (true, false) => interval.start = value + 1,
            (false, true) => interval.end = value - 1,
            (false, false) => {
                let upper = Interval {
                    start: value + 1,
                    end: interval.end,
                };
                interval.end = value - 1;
                self.intervals.insert(index + 1, upper);
            }
        }

        true
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    #[cfg(test)]
    pub fn interval_len(&self) -> usize {
        self.intervals.len()
    }
}
