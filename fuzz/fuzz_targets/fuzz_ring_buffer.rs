//! Fuzz target: `RingBuffer` operation sequences
//!
//! Interprets each input byte as an operation (append / consume / clear /
//! get) and checks the counter invariants after every step.
//!
//! cargo fuzz run fuzz_ring_buffer

#![no_main]

use envmon::clock::WallTime;
use envmon::records::{Luminosity, Record, RingBuffer};
use libfuzzer_sys::fuzz_target;

const N: usize = 20;

fuzz_target!(|data: &[u8]| {
    let mut buf = RingBuffer::<N>::new();
    for &byte in data {
        match byte % 8 {
            0..=3 => buf.append(Record {
                time: WallTime::MIDNIGHT,
                temperature: byte,
                luminosity: Luminosity::from_fraction(f32::from(byte) / 255.0),
            }),
            4 | 5 => {
                let had_unread = buf.unread() > 0;
                assert_eq!(buf.consume_oldest_unread().is_some(), had_unread);
            }
            6 => buf.clear(),
            _ => {
                let index = usize::from(byte >> 3);
                assert_eq!(buf.get(index).is_some(), index < buf.len());
            }
        }
        let info = buf.info();
        assert!(info.valid <= N && info.unread <= info.valid);
        assert!(info.write_index < N && info.read_index < N);
    }
});
