//! Match patterns with metavariables against expressions.

use clap::Parser;
use mmatch::{process, Error, Opt};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env("LOG").init();

    let opt = Opt::parse();

    // if a precise number of parallel jobs has been given
    if let Some(Some(jobs)) = opt.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()?;
    }

    let parallel = opt.jobs.is_some();

    // if parallel execution is enabled, assume an unbounded channel by default
    let channel = if parallel {
        Some(opt.channel_capacity.unwrap_or(None))
    } else {
        opt.channel_capacity
    };

    match channel {
        Some(capacity) => {
            let (sender, receiver) = match capacity {
                Some(capacity) => flume::bounded(capacity),
                None => flume::unbounded(),
            };

            let optr = opt.clone();
            let consumer = std::thread::spawn(move || process::consume(receiver.into_iter(), &optr));

            process::produce(&opt.files, |event| sender.send(event))?;

            // signalise that we are done sending events
            // (otherwise the consumer will eventually wait forever)
            drop(sender);

            // wait for all events to be consumed
            let result = consumer.join().unwrap_or_else(|e| std::panic::resume_unwind(e));
            result?
        }
        None => process::run(&opt)?,
    }
    Ok(())
}
