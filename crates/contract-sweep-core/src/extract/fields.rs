use regex::Regex;

lazy_static::lazy_static! {
    static ref CONTRACT_DATE: Regex = Regex::new(r"(?i)Contract Date[:\s]*([\d/\.-]+)").unwrap();
    static ref EFFECTIVE_DATE: Regex = Regex::new(r"(?i)Effective Date[:\s]*([\d/\.-]+)").unwrap();
    static ref EXPIRATION_DATE: Regex = Regex::new(r"(?i)Expiration Date[:\s]*([\d/\.-]+)").unwrap();
    static ref PARTIES: Regex = Regex::new(r"(?i)between\s+(.*?)\s+and\s+(.*?)([\.,\n]|$)").unwrap();
    static ref AMOUNT: Regex = Regex::new(r"\$\s?(\d{1,3}(?:,\d{3})+|\d+)(\.\d{2})?").unwrap();
}

/// Fields pulled from contract text. Anything not found stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFields {
    pub contract_date: String,
    pub effective_date: String,
    pub expiration_date: String,
    pub party_1: String,
    pub party_2: String,
    /// First dollar figure in the text, e.g. `$12,500.00`.
    pub amount: String,
}

fn first_group(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn extract_fields(text: &str) -> ContractFields {
    let (party_1, party_2) = PARTIES
        .captures(text)
        .map(|c| (c[1].trim().to_string(), c[2].trim().to_string()))
        .unwrap_or_default();

    ContractFields {
        contract_date: first_group(&CONTRACT_DATE, text),
        effective_date: first_group(&EFFECTIVE_DATE, text),
        expiration_date: first_group(&EXPIRATION_DATE, text),
        party_1,
        party_2,
        amount: AMOUNT
            .find(text)
            .map(|m| m.as_str().replace(' ', ""))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fields() {
        let text = "MASTER SERVICES AGREEMENT\n\
                    This agreement is entered into between Acme Corp and Spreedly, Inc.\n\
                    Effective Date: 01/15/2022\n\
                    expiration date 2025-01-14\n\
                    Fees total $ 12,500.00 per year, payable in advance.\n";
        let fields = extract_fields(text);
        assert_eq!(fields.effective_date, "01/15/2022");
        assert_eq!(fields.expiration_date, "2025-01-14");
        assert_eq!(fields.contract_date, "");
        assert_eq!(fields.party_1, "Acme Corp");
        assert_eq!(fields.party_2, "Spreedly");
        assert_eq!(fields.amount, "$12,500.00");
    }

    #[test]
    fn test_extract_fields_empty_text() {
        assert_eq!(extract_fields(""), ContractFields::default());
    }
}
