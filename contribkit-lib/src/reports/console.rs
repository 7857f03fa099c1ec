use crate::Result;
use crate::providers::Sponsorship;
use core::fmt::Write;

pub fn generate<W: Write>(records: &[Sponsorship], writer: &mut W) -> Result<()> {
    writeln!(writer, "{} record(s)", records.len())?;

    let login_width = records.iter().map(|r| r.sponsor.login.len()).max().unwrap_or(0);

    for record in records {
        writeln!(
            writer,
            "  {:<20} {:<12} {:<login_width$} {:>10.2}",
            record.provider.to_string(),
            record.sponsor.kind.to_string(),
            record.sponsor.login,
            record.weight
        )?;
    }

    Ok(())
}
