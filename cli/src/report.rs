//! Stdout rendering for command results.
//!
//! Stdout only ever carries the result; logs go to stderr. In plain mode a
//! verdict is printed as its literal text so a downstream decision step can
//! match on `TRUSTED` exactly.

use std::io::{self, Write};
use std::process::ExitCode;

use serde::Serialize;
use trustgate_core::{GateVerdict, RegistryStatus};

pub const EXIT_TRUSTED: u8 = 0;
pub const EXIT_UNTRUSTED: u8 = 1;
pub const EXIT_ERROR: u8 = 2;
pub const EXIT_NOT_CONFIGURED: u8 = 3;

pub fn verdict_exit_code(verdict: &GateVerdict) -> u8 {
    match verdict {
        GateVerdict::Trusted => EXIT_TRUSTED,
        GateVerdict::Untrusted => EXIT_UNTRUSTED,
        GateVerdict::Error(_) => EXIT_ERROR,
        GateVerdict::NotConfigured(_) => EXIT_NOT_CONFIGURED,
    }
}

#[derive(Debug, Serialize)]
pub struct VerdictReport<'a> {
    pub verdict: &'static str,
    pub message: String,
    pub permits_delegation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a str>,
}

impl<'a> VerdictReport<'a> {
    pub fn new(verdict: &GateVerdict, address: Option<&'a str>) -> Self {
        Self {
            verdict: verdict.kind(),
            message: verdict.to_string(),
            permits_delegation: verdict.permits_delegation(),
            address,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChecksumReport<'a> {
    input: &'a str,
    address: &'a str,
}

pub struct Reporter<W> {
    out: W,
    json: bool,
}

impl Reporter<io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self {
            out: io::stdout(),
            json,
        }
    }
}

impl<W: Write> Reporter<W> {
    #[cfg(test)]
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn verdict(&mut self, verdict: &GateVerdict, address: Option<&str>) -> io::Result<ExitCode> {
        if self.json {
            self.write_json(&VerdictReport::new(verdict, address))?;
        } else {
            writeln!(self.out, "{verdict}")?;
        }
        Ok(ExitCode::from(verdict_exit_code(verdict)))
    }

    pub fn checksum(&mut self, input: &str, address: &str) -> io::Result<()> {
        if self.json {
            self.write_json(&ChecksumReport { input, address })
        } else {
            writeln!(self.out, "{address}")
        }
    }

    pub fn status(&mut self, status: &RegistryStatus) -> io::Result<ExitCode> {
        if self.json {
            self.write_json(status)?;
        } else {
            self.write_status_text(status)?;
        }
        let code = if status.is_ready() {
            EXIT_TRUSTED
        } else {
            EXIT_ERROR
        };
        Ok(ExitCode::from(code))
    }

    fn write_status_text(&mut self, status: &RegistryStatus) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "endpoint:          {}", status.endpoint)?;
        writeln!(out, "chain id:          {}", or_dash(status.chain_id))?;
        writeln!(out, "descriptor:        {}", status.descriptor_path)?;
        writeln!(
            out,
            "contract:          {}",
            status.contract_address.as_deref().unwrap_or("-")
        )?;
        writeln!(out, "deployed:          {}", yes_no(status.contract_deployed))?;
        writeln!(out, "method:            {}", status.method)?;
        writeln!(out, "method present:    {}", yes_no(status.method_present))?;
        writeln!(out, "method read-only:  {}", yes_no(status.method_read_only))?;
        if let Some(error) = &status.error {
            writeln!(out, "error:             {error}")?;
        }
        writeln!(
            out,
            "ready:             {}",
            if status.is_ready() { "yes" } else { "no" }
        )
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }
}

fn or_dash(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}
