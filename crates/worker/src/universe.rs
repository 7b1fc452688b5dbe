/// CAC 40 constituents, Euronext Paris tickers.
pub const FRENCH_SYMBOLS: &[&str] = &[
    "OR.PA",   // L'Oréal
    "MC.PA",   // LVMH
    "AI.PA",   // Air Liquide
    "BN.PA",   // Danone
    "SAN.PA",  // Sanofi
    "SU.PA",   // Schneider Electric
    "TTE.PA",  // TotalEnergies
    "BNP.PA",  // BNP Paribas
    "GLE.PA",  // Société Générale
    "CA.PA",   // Carrefour
    "ACA.PA",  // Crédit Agricole
    "RI.PA",   // Pernod Ricard
    "CAP.PA",  // Capgemini
    "EN.PA",   // Bouygues
    "VIV.PA",  // Vivendi
    "HO.PA",   // Thales
    "KER.PA",  // Kering
    "ENGI.PA", // Engie
    "AIR.PA",  // Airbus
    "ATO.PA",  // Atos
    "ML.PA",   // Michelin
    "PUB.PA",  // Publicis
    "RMS.PA",  // Hermès
    "SW.PA",   // Sodexo
    "DSY.PA",  // Dassault Systèmes
    "ORA.PA",  // Orange
    "LR.PA",   // Legrand
    "SK.PA",   // SEB
    "AC.PA",   // Accor
];

/// Symbols to fetch: an explicit comma-separated list wins over the
/// `SYMBOLS` setting, which wins over the built-in list.
pub fn resolve_symbols(arg: Option<&str>, configured: Option<&str>) -> anyhow::Result<Vec<String>> {
    let out = match arg.or(configured) {
        Some(list) => parse_list(list),
        None => FRENCH_SYMBOLS.iter().map(|s| s.to_string()).collect(),
    };

    anyhow::ensure!(!out.is_empty(), "symbol list must be non-empty");
    Ok(out)
}

fn parse_list(list: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in list.split(',') {
        let s = part.trim().to_ascii_uppercase();
        if s.is_empty() || out.contains(&s) {
            continue;
        }
        out.push(s);
    }
    out
}
