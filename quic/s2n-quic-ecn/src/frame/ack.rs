// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::inet::ExplicitCongestionNotification;

#[cfg(any(test, feature = "generator"))]
use bolero_generator::prelude::*;

//= https://www.rfc-editor.org/rfc/rfc9000#section-19.3.2
//# The ACK frame uses the least significant bit of the type value (that
//# is, type 0x03) to indicate ECN feedback and report receipt of QUIC
//# packets with associated ECN codepoints of ECT(0), ECT(1), or ECN-CE
//# in the packet's IP header.
//#
//# ECN counts are maintained separately for each packet number space.

/// Cumulative ECN counters, either reported by the peer in an ACK frame or
/// tallied locally for the packets that were sent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "generator"), derive(TypeGenerator))]
pub struct EcnCounts {
    /// The total number of packets with the ECT(0) codepoint
    pub ect_0_count: u64,

    /// The total number of packets with the ECT(1) codepoint
    pub ect_1_count: u64,

    /// The total number of packets with the CE codepoint
    pub ce_count: u64,
}

impl EcnCounts {
    #[inline]
    pub const fn new(ect_0_count: u64, ect_1_count: u64, ce_count: u64) -> Self {
        Self {
            ect_0_count,
            ect_1_count,
            ce_count,
        }
    }

    /// Increment the count for the given `ExplicitCongestionNotification`
    ///
    /// `NotEct` has no counter and is ignored.
    #[inline]
    pub fn increment(&mut self, ecn: ExplicitCongestionNotification) {
        match ecn {
            ExplicitCongestionNotification::Ect0 => {
                self.ect_0_count = self.ect_0_count.saturating_add(1)
            }
            ExplicitCongestionNotification::Ect1 => {
                self.ect_1_count = self.ect_1_count.saturating_add(1)
            }
            ExplicitCongestionNotification::Ce => self.ce_count = self.ce_count.saturating_add(1),
            ExplicitCongestionNotification::NotEct => {}
        }
    }

    /// Gets an optional version of the `EcnCounts`, returning `None` if all counts are zero
    #[inline]
    pub fn as_option(&self) -> Option<Self> {
        if *self == Self::default() {
            None
        } else {
            Some(*self)
        }
    }

    /// Subtracts `rhs` from each counter, returning `None` if any counter would go below zero
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Some(Self {
            ect_0_count: self.ect_0_count.checked_sub(rhs.ect_0_count)?,
            ect_1_count: self.ect_1_count.checked_sub(rhs.ect_1_count)?,
            ce_count: self.ce_count.checked_sub(rhs.ce_count)?,
        })
    }

    /// The sum of all three counters, saturating at `u64::MAX`
    #[inline]
    pub fn total(&self) -> u64 {
        self.ect_0_count
            .saturating_add(self.ect_1_count)
            .saturating_add(self.ce_count)
    }
}
