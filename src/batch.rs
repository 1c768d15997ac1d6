//! Parallel decoding of independent buffers.
//!
//! Sessions are single-threaded, so every job gets its own session on the
//! rayon pool. Results come back in job order.

use log::debug;
use rayon::prelude::*;

use crate::error::Result;
use crate::insn::Insn;
use crate::session::Session;
use crate::{Address, Arch, Mode};

/// One buffer to decode and its load address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job<'a> {
    pub code: &'a [u8],
    pub address: Address,
}

impl<'a> Job<'a> {
    pub fn new(code: &'a [u8], address: Address) -> Self {
        Self { code, address }
    }
}

/// Decode every job with default session options.
pub fn disassemble_parallel(arch: Arch, mode: Mode, jobs: &[Job<'_>]) -> Result<Vec<Result<Vec<Insn>>>> {
    disassemble_parallel_with(arch, mode, jobs, |_| Ok(()))
}

/// Decode every job, running `setup` on each fresh session first.
///
/// An invalid `arch`/`mode` pair fails the whole batch; decode errors are
/// reported per job.
pub fn disassemble_parallel_with<F>(
    arch: Arch,
    mode: Mode,
    jobs: &[Job<'_>],
    setup: F,
) -> Result<Vec<Result<Vec<Insn>>>>
where
    F: Fn(&mut Session) -> Result<()> + Sync,
{
    Session::open(arch, mode)?;
    debug!(
        "{}: decoding {} buffers on {} threads",
        arch,
        jobs.len(),
        rayon::current_num_threads()
    );
    let results = jobs
        .par_iter()
        .map(|job| {
            let mut cs = Session::open(arch, mode)?;
            setup(&mut cs)?;
            cs.disassemble(job.code, job.address, None)
        })
        .collect();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_results_keep_job_order() {
        let bufs: Vec<Vec<u8>> = (0..32u8).map(|n| vec![0x90; n as usize % 5 + 1]).collect();
        let jobs: Vec<_> = bufs
            .iter()
            .enumerate()
            .map(|(i, b)| Job::new(b, 0x1000 * i as Address))
            .collect();
        let results = disassemble_parallel(Arch::X86, Mode::MODE_32, &jobs).unwrap();
        assert_eq!(results.len(), jobs.len());
        for (i, res) in results.iter().enumerate() {
            let insns = res.as_ref().unwrap();
            assert_eq!(insns.len(), bufs[i].len());
            assert_eq!(insns[0].address, 0x1000 * i as Address);
        }
    }

    #[test]
    fn test_setup_and_per_job_errors() {
        let good = [0x55];
        let bad = [0x0f];
        let jobs = [Job::new(&good, 0), Job::new(&bad, 0)];
        let results = disassemble_parallel_with(Arch::X86, Mode::MODE_64, &jobs, |cs| {
            cs.set_detail(true)
        })
        .unwrap();
        assert!(results[0].as_ref().unwrap()[0].detail.is_some());
        assert_eq!(
            results[1].as_ref().unwrap_err().code(),
            ErrorCode::DisassemblyFailed
        );
    }

    #[test]
    fn test_bad_mode_fails_batch() {
        let jobs = [Job::new(&[0x90], 0)];
        assert!(disassemble_parallel(Arch::X86, Mode::THUMB, &jobs).is_err());
    }
}
