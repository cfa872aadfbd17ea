// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod api;
pub mod builder;
mod subscriber;

#[cfg(feature = "event-tracing")]
pub mod tracing;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use subscriber::{Publisher, PublisherSubscriber, Subscriber};

/// All event types which can be emitted from this library.
pub trait Event {
    const NAME: &'static str;
}

/// Converts a builder value into the value exposed to subscribers
pub trait IntoEvent<Target> {
    fn into_event(self) -> Target;
}

macro_rules! ident_into_event {
    ($($name:ty),* $(,)?) => {
        $(
            impl IntoEvent<$name> for $name {
                #[inline]
                fn into_event(self) -> Self {
                    self
                }
            }
        )*
    };
}

ident_into_event!(u8, u16, u32, u64, usize, bool);

impl<T: IntoEvent<U>, U> IntoEvent<Option<U>> for Option<T> {
    #[inline]
    fn into_event(self) -> Option<U> {
        self.map(IntoEvent::into_event)
    }
}
