// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

//= https://www.rfc-editor.org/rfc/rfc9000#section-13.4.2
//# If an endpoint has cause to expect that IP packets with an ECT codepoint
//# might be dropped by a faulty network element, the endpoint could set an
//# ECT codepoint for only the first ten outgoing packets on a path, or for
//# a period of three PTOs
pub const TESTING_PACKET_THRESHOLD: u8 = 10;

/// Settings for the ECN validation of a single path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    testing_packet_threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            testing_packet_threshold: TESTING_PACKET_THRESHOLD,
        }
    }

    /// Sets the number of ECT-marked packets sent while testing a path
    ///
    /// Once this many testing packets have been sent, the path stops marking
    /// packets until one of them is acknowledged.
    pub fn with_testing_packet_threshold(mut self, value: u8) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError(
                "testing_packet_threshold must be greater than zero",
            ));
        }
        self.testing_packet_threshold = value;
        Ok(self)
    }

    #[inline]
    pub fn testing_packet_threshold(&self) -> u8 {
        self.testing_packet_threshold
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidationError(&'static str);

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValidationError {}
