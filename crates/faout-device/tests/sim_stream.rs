//! Streaming and flow-control behavior of the full driver stack against
//! the soft FAOUT model.

use std::time::Duration;

use faout_device::regmap::{REG_SDRAM_DATA, SDRAM_CAPACITY};
use faout_device::{Device, DeviceError, SimCommand, SimLink};
use faout_transport::{NoopSleep, RetryPolicy};

fn sim_device() -> Device<SimLink, NoopSleep> {
    Device::with_parts(
        SimLink::new(),
        RetryPolicy {
            max_attempts: 4,
            interval: Duration::from_millis(1),
        },
        NoopSleep::default(),
    )
}

fn ramp(len: usize) -> Vec<u16> {
    (0..len).map(|i| (i % 65536) as u16).collect()
}

fn bulk_write_chunks(commands: &[SimCommand]) -> Vec<u16> {
    commands
        .iter()
        .filter_map(|cmd| match cmd {
            SimCommand::WriteRegN(reg, count) if *reg == REG_SDRAM_DATA => Some(*count),
            _ => None,
        })
        .collect()
}

fn bulk_read_chunks(commands: &[SimCommand]) -> Vec<u16> {
    commands
        .iter()
        .filter_map(|cmd| match cmd {
            SimCommand::ReadRegN(reg, count) if *reg == REG_SDRAM_DATA => Some(*count),
            _ => None,
        })
        .collect()
}

#[test]
fn large_stream_round_trips_in_order() {
    let mut dev = sim_device();
    let data = ramp(200_000);

    dev.sdram_write(&data).expect("write should fit");
    let ptrs = dev.sdram_pointers().expect("pointer query");
    assert_eq!(ptrs.available(), 200_000);

    let back = dev
        .sdram_read(Some(200_000))
        .expect("read should reproduce the stream");
    assert_eq!(back, data);

    // 200 000 words cross the 16-bit count field three times.
    let commands = dev.link().commands();
    assert_eq!(
        bulk_write_chunks(commands),
        vec![65_535, 65_535, 65_535, 3_395]
    );
    assert_eq!(
        bulk_read_chunks(commands),
        vec![65_535, 65_535, 65_535, 3_395]
    );
}

#[test]
fn chunk_boundary_is_exact() {
    let mut dev = sim_device();

    dev.sdram_write(&ramp(65_535)).expect("one full chunk");
    assert_eq!(bulk_write_chunks(dev.link().commands()), vec![65_535]);

    dev.link_mut().clear_commands();
    dev.sdram_write(&ramp(1)).expect("one more word");
    assert_eq!(bulk_write_chunks(dev.link().commands()), vec![1]);

    dev.link_mut().clear_commands();
    let back = dev.sdram_read(None).expect("drain everything");
    assert_eq!(back.len(), 65_536);
    assert_eq!(bulk_read_chunks(dev.link().commands()), vec![65_535, 1]);
}

#[test]
fn read_defaults_to_everything_available() {
    let mut dev = sim_device();
    dev.sdram_write(&[5, 6, 7]).expect("write");

    assert_eq!(dev.sdram_read(None).expect("default read"), vec![5, 6, 7]);
    assert_eq!(dev.sdram_pointers().expect("ptrs").available(), 0);
}

#[test]
fn empty_buffer_read_is_empty_without_bulk_io() {
    let mut dev = sim_device();

    let words = dev.sdram_read(None).expect("empty read");
    assert!(words.is_empty());
    assert!(bulk_read_chunks(dev.link().commands()).is_empty());
}

#[test]
fn underflow_is_rejected_before_any_bulk_command() {
    let mut dev = sim_device();
    dev.sdram_write(&ramp(50)).expect("write 50 words");
    dev.link_mut().clear_commands();

    let err = dev.sdram_read(Some(60)).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::BufferUnderflow {
            requested: 60,
            available: 50
        }
    ));

    // Only the four pointer reads may have hit the link.
    let commands = dev.link().commands();
    assert!(bulk_read_chunks(commands).is_empty());
    assert_eq!(
        commands
            .iter()
            .filter(|cmd| matches!(cmd, SimCommand::ReadReg(_)))
            .count(),
        4
    );
    assert_eq!(commands.len(), 4);
}

#[test]
fn overflow_is_rejected_before_any_bulk_command() {
    let mut dev = sim_device();
    dev.link_mut().set_sdram_pointers(0, SDRAM_CAPACITY - 10);
    dev.link_mut().clear_commands();

    let err = dev.sdram_write(&ramp(11)).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::BufferOverflow {
            requested: 11,
            free: 10
        }
    ));
    assert!(bulk_write_chunks(dev.link().commands()).is_empty());
}

#[test]
fn write_up_to_the_region_end_succeeds() {
    let mut dev = sim_device();
    dev.link_mut().set_sdram_pointers(0, SDRAM_CAPACITY - 10);

    dev.sdram_write(&ramp(10)).expect("exactly fills the region");
    let ptrs = dev.sdram_pointers().expect("ptrs");
    assert_eq!(ptrs.free_space(), 0);

    let err = dev.sdram_write(&[0]).unwrap_err();
    assert!(matches!(err, DeviceError::BufferOverflow { .. }));
}

#[test]
fn zero_length_write_never_overflows() {
    let mut dev = sim_device();
    dev.sdram_write(&[]).expect("empty write is a no-op");
    assert!(bulk_write_chunks(dev.link().commands()).is_empty());
}

#[test]
fn interleaved_sessions_preserve_order() {
    let mut dev = sim_device();

    dev.sdram_write(&ramp(100)).expect("first batch");
    let first = dev.sdram_read(Some(40)).expect("partial drain");
    assert_eq!(first, ramp(40));

    dev.sdram_write(&[0xAAAA; 10]).expect("second batch");
    let rest = dev.sdram_read(None).expect("drain the rest");

    let mut expected: Vec<u16> = ramp(100)[40..].to_vec();
    expected.extend_from_slice(&[0xAAAA; 10]);
    assert_eq!(rest, expected);
}
