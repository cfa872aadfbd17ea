// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#[cfg(any(test, feature = "generator"))]
use bolero_generator::prelude::*;

//= https://www.rfc-editor.org/rfc/rfc3168#section-5
//# This document specifies that the Internet provide a congestion
//# indication for incipient congestion (as in RED and earlier work
//# [RJ90]) where the notification can sometimes be through marking
//# packets rather than dropping them.

/// The two-bit ECN field carried in the IP header
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
#[cfg_attr(any(test, feature = "generator"), derive(TypeGenerator))]
pub enum ExplicitCongestionNotification {
    /// The packet is not using ECN
    NotEct = 0b00,

    /// ECN-capable transport, codepoint 1
    Ect1 = 0b01,

    /// ECN-capable transport, codepoint 0
    ///
    /// Senders that only require a single ECT codepoint use ECT(0)
    Ect0 = 0b10,

    /// Set by a network element to signal congestion to the end nodes
    Ce = 0b11,
}

impl Default for ExplicitCongestionNotification {
    #[inline]
    fn default() -> Self {
        Self::NotEct
    }
}

impl ExplicitCongestionNotification {
    /// Reads the codepoint from the ECN bits of an IP header field
    #[inline]
    pub fn new(ecn_field: u8) -> Self {
        match ecn_field & 0b11 {
            0b01 => Self::Ect1,
            0b10 => Self::Ect0,
            0b11 => Self::Ce,
            _ => Self::NotEct,
        }
    }

    /// Returns true if the codepoint is anything other than `NotEct`
    #[inline]
    pub fn using_ecn(self) -> bool {
        self != Self::NotEct
    }

    /// Returns true for the ECN-capable transport codepoints, ECT(0) and ECT(1)
    ///
    /// These are the only marks a sender applies; CE is only ever set by the network.
    #[inline]
    pub fn is_ect(self) -> bool {
        matches!(self, Self::Ect0 | Self::Ect1)
    }

    /// Returns true if congestion was experienced on the path
    #[inline]
    pub fn congestion_experienced(self) -> bool {
        self == Self::Ce
    }
}
