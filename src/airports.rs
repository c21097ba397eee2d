// src/airports.rs
use std::fmt;

use serde::Serialize;

/// Airports the prediction service has history for. Anything else is treated as
/// international and gets no prediction.
pub static DOMESTIC_AIRPORTS: &[&str] = &[
    "FAI", "EWR", "MLI", "PIE", "MEM", "SJC", "GRR", "BDL", "CID", "TUS", "JNU", "IDA",
    "SAT", "PDX", "TPA", "BUR", "DAY", "ANC", "MLB", "ICT", "SMF", "ORD", "PIA", "KTN",
    "SNA", "MSY", "AVP", "SBP", "GEG", "GUM", "BTR", "STL", "MSN", "TTN", "PBI", "FAR",
    "FLL", "FCA", "EUG", "GSP", "SRQ", "TLH", "XNA", "RIC", "PHL", "JAX", "OMA", "LIT",
    "BOS", "CDV", "MKE", "SFO", "SDF", "PNS", "VPS", "MAF", "RSW", "PWM", "BZN", "ITO",
    "SIT", "MSP", "BNA", "SAN", "FAY", "BLI", "AMA", "GSO", "ACY", "TYS", "BIL", "SGF",
    "GTF", "DEN", "CMH", "ACK", "DAL", "RAP", "WRG", "TUL", "BWI", "HRL", "ONT", "ASE",
    "HPN", "PGD", "ILM", "BQN", "ROC", "LGB", "SBA", "OGG", "MSO", "SLC", "ORF", "LIH",
    "SUN", "MHT", "STX", "SHV", "AZA", "BHM", "PIT", "HSV", "BGR", "LBE", "EYW", "CLE",
    "LEX", "DTW", "CHS", "LGA", "ATW", "LBB", "SAV", "KOA", "JAN", "MTJ", "MDW", "FWA",
    "GPT", "HOU", "ABQ", "SBN", "MYR", "BFL", "ISP", "FAT", "CAK", "CMI", "IND", "MCI",
    "SYR", "CWA", "BUF", "EGE", "MIA", "STT", "AVL", "LAS", "ABE", "MFE", "LAX", "DCA",
    "GRB", "DAB", "ALB", "RDM", "OKC", "JFK", "JAC", "AUS", "IAH", "OAK", "HDN", "RNO",
    "ECP", "HNL", "PVD", "CHO", "TVC", "FSD", "IAD", "SJU", "PSC", "DSM", "CAE", "PSG",
    "YAK", "LNK", "SFB", "OME", "CLT", "BTV", "ELP", "EVV", "PSP", "BOI", "RDU", "MCO",
    "MDT", "LCK", "CHA", "SEA", "ATL", "CRP", "MFR", "PHX", "COS", "CVG",
];

pub fn is_domestic(code: &str) -> bool {
    DOMESTIC_AIRPORTS.contains(&code)
}

/// A validated, domestic IATA code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn domestic(code: &str) -> Option<Self> {
        let code = code.trim();
        if is_domestic(code) { Some(Self(s!(code))) } else { None }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist() {
        assert_eq!(DOMESTIC_AIRPORTS.len(), 190);
        assert!(AirportCode::domestic(" JFK ").is_some());
        assert!(AirportCode::domestic("LHR").is_none());
        assert!(AirportCode::domestic("jfk").is_none());
    }
}
