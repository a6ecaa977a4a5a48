use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::discretization::cloud::Cloud;
use crate::numerics::transient::WaveSolution;

/// Write column-major data to CSV with a header row.
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], data: &[Vec<f64>]) -> io::Result<()> {
    if !headers.is_empty() && !data.is_empty() && headers.len() != data.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "Headers count ({}) doesn't match data columns ({})",
                headers.len(),
                data.len()
            ),
        ));
    }

    let mut file = File::create(path)?;
    writeln!(file, "{}", headers.join(","))?;

    let n_rows = data.iter().map(|col| col.len()).max().unwrap_or(0);
    for i in 0..n_rows {
        let row: Vec<String> = data
            .iter()
            .map(|col| col.get(i).map(|v| format!("{v:.15e}")).unwrap_or_default())
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }

    Ok(())
}

/// `x, y, approximate, exact` at time level `level`.
pub fn write_snapshot<P: AsRef<Path>>(
    path: P,
    cloud: &Cloud,
    solution: &WaveSolution,
    level: usize,
) -> io::Result<()> {
    if level >= solution.num_levels() || solution.approximate.nrows() != cloud.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "level {level} of a {}x{} solution does not fit a cloud of {} nodes",
                solution.approximate.nrows(),
                solution.num_levels(),
                cloud.len()
            ),
        ));
    }

    let x: Vec<f64> = cloud.positions().map(|p| p.x).collect();
    let y: Vec<f64> = cloud.positions().map(|p| p.y).collect();
    let approximate: Vec<f64> = solution.approximate.column(level).iter().copied().collect();
    let exact: Vec<f64> = solution.exact.column(level).iter().copied().collect();
    write_csv(
        path,
        &["x", "y", "approximate", "exact"],
        &[x, y, approximate, exact],
    )
}

/// `t, rms` per level.
pub fn write_error_series<P: AsRef<Path>>(path: P, times: &[f64], rms: &[f64]) -> io::Result<()> {
    if times.len() != rms.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "time and error series lengths don't match ({} vs {})",
                times.len(),
                rms.len()
            ),
        ));
    }
    write_csv(path, &["t", "rms"], &[times.to_vec(), rms.to_vec()])
}
