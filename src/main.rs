//! cdcsim: cycle-level dual-clock FIFO simulator

use std::env;

use cdcsim::config::Config;
use cdcsim::fifo::AsyncFifo;
use cdcsim::sim::DualClockHarness;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let config = Config::get();
    let mut address_bits = config.address_bits();
    let mut data_width = config.data_width();
    let mut sync_stages = config.sync_stages();
    let mut write_interval = config.write_interval();
    let mut read_interval = config.read_interval();
    let mut items = config.items();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--sample-config" => {
                print!("{}", Config::sample_config());
                return Ok(());
            }
            "--depth" => address_bits = parse_value(iter.next(), "--depth")?,
            "--width" => data_width = parse_value(iter.next(), "--width")?,
            "--sync-stages" => sync_stages = parse_value(iter.next(), "--sync-stages")?,
            "--items" => items = parse_value(iter.next(), "--items")?,
            "--ratio" => {
                let spec = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--ratio requires a value, e.g. 3:1"))?;
                let (w, r) = spec
                    .split_once(':')
                    .ok_or_else(|| anyhow::anyhow!("--ratio expects W:R, got '{}'", spec))?;
                // W:R is a clock-rate ratio; a faster clock ticks at a
                // shorter interval, so the terms swap.
                read_interval = w.parse()?;
                write_interval = r.parse()?;
            }
            other => {
                anyhow::bail!("unknown argument '{}' (try --help)", other);
            }
        }
    }

    let fifo = AsyncFifo::with_sync_stages(address_bits, data_width, sync_stages as usize)?;
    println!(
        "cdcsim: depth {} (address_bits={}), data_width={}, sync_stages={}",
        fifo.capacity(),
        address_bits,
        data_width,
        sync_stages
    );
    println!(
        "        clock ratio write:read = {}:{}, {} items",
        read_interval, write_interval, items
    );
    println!();

    let mut harness = DualClockHarness::new(fifo, write_interval, read_interval);
    let mask = if data_width == 64 {
        u64::MAX
    } else {
        (1u64 << data_width) - 1
    };
    let payload: Vec<u64> = (0..items)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17) & mask)
        .collect();
    harness.push_source(payload.iter().copied());

    let limit = 64 * (items + 16) * write_interval.max(read_interval);
    let steps = harness.run_until_drained(payload.len(), limit);

    harness.print_status();
    println!();

    if harness.drained() == payload.as_slice() {
        println!("PASS: {} words round-tripped in {} steps", items, steps);
        Ok(())
    } else {
        anyhow::bail!(
            "FAIL: drained {} of {} words, output diverged from input",
            harness.drained().len(),
            items
        )
    }
}

fn parse_value<T: std::str::FromStr>(arg: Option<&String>, flag: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    let raw = arg.ok_or_else(|| anyhow::anyhow!("{} requires a value", flag))?;
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid value for {}: {}", flag, e))
}

fn print_usage() {
    println!("cdcsim - cycle-level dual-clock FIFO simulator");
    println!();
    println!("USAGE:");
    println!("  cdcsim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  --depth N         log2 of FIFO depth (default 4)");
    println!("  --width N         payload width in bits, 1..=64 (default 16)");
    println!("  --sync-stages N   synchronizer depth per crossing (default 2)");
    println!("  --ratio W:R       write:read clock-rate ratio (default 1:1)");
    println!("  --items N         words to push through the FIFO (default 256)");
    println!("  --sample-config   print a sample cdcsim.toml and exit");
    println!("  -h, --help        show this help");
    println!();
    println!("Defaults can also be set in ./cdcsim.toml or via CDCSIM_* env vars.");
}
