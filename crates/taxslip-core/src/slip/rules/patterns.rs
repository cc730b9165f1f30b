//! Built-in regex patterns for Canadian tax slip extraction.
//!
//! Candidate order within each field is significant: the first candidate
//! that produces a capture wins.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // SIN (Social Insurance Number): 3-3-3 digits, separators tolerated
    pub static ref SIN_PATTERN: Regex = Regex::new(
        r"\b\d{3}[\s\-]*\d{3}[\s\-]*\d{3}\b"
    ).unwrap();

    // Slip titles
    pub static ref SLIP_T4: Regex = Regex::new(
        r"(?i)T4\s*(Statement of Remuneration Paid)?"
    ).unwrap();

    pub static ref SLIP_T4A: Regex = Regex::new(
        r"(?i)T4A\s*(Statement of Pension)"
    ).unwrap();

    pub static ref SLIP_T5: Regex = Regex::new(
        r"(?i)T5\s*(Statement of Investment Income)"
    ).unwrap();

    pub static ref SLIP_T3: Regex = Regex::new(
        r"(?i)T3\s*(Statement of Trust Income)"
    ).unwrap();

    pub static ref SLIP_T5008: Regex = Regex::new(
        r"(?i)T5008\s*(Statement of Securities Transactions)"
    ).unwrap();

    pub static ref SLIP_T1135: Regex = Regex::new(
        r"(?i)T1135\s*(Foreign Income Verification Statement)"
    ).unwrap();

    pub static ref SLIP_CAPITAL_GAINS: Regex = Regex::new(
        r"(?i)(Capital Gains|Realized Gain)\s*(Summary|Statement)"
    ).unwrap();

    pub static ref SLIP_SUMMARY: Regex = Regex::new(
        r"(?i)(Tax Return Summary|T1 Summary|Summary of.*Returns)"
    ).unwrap();

    // Issuer name candidates
    pub static ref ISSUER_LABELED: Regex = Regex::new(
        r"(?i)(?:Issuer|Payer|Employer|Institution):\s*([^\n]*)"
    ).unwrap();

    pub static ref ISSUER_NAME_LINE: Regex = Regex::new(
        r"(?i)(?:Company|Business|Fund) Name:\s*([^\n]*)"
    ).unwrap();

    pub static ref ISSUER_FROM_ENTITY: Regex = Regex::new(
        r"(?i)(?:From|By):\s*([^\n]*\b(?:Inc|Ltd|Corp|Limited|Bank)\b[^\n]*)"
    ).unwrap();

    // Taxpayer name candidates
    pub static ref TAXPAYER_LABELED: Regex = Regex::new(
        r"(?i)(?:Recipient|Employee|Individual|Taxpayer)\s*Name:\s*([^\n]*)"
    ).unwrap();

    pub static ref TAXPAYER_SURNAME_FIRST: Regex = Regex::new(
        r"(?i)(?:Last Name|Surname)\s*,\s*(?:First Name|Given Name):\s*([^\n]*)"
    ).unwrap();

    pub static ref TAXPAYER_ADDRESSEE: Regex = Regex::new(
        r"(?i)(?:Name of|To):\s*([^\n]*)"
    ).unwrap();
}
