use crate::domain::{Account, AmountType};

/// Accounts used when no accounts file exists yet
pub fn default_accounts<A: AmountType>() -> Vec<Account<A>> {
    vec![
        Account::new(
            "1111222233334444",
            "Sumitha",
            "1234",
            "123456789",
            A::from_whole_units(5000),
        ),
        Account::new(
            "2222333344445555",
            "Divya",
            "2345",
            "987654321",
            A::from_whole_units(6000),
        ),
        Account::new(
            "3333444455556666",
            "Manish",
            "3456",
            "112233445",
            A::from_whole_units(7000),
        ),
        Account::new(
            "4444555566667777",
            "Nandhini",
            "4567",
            "556677889",
            A::from_whole_units(8000),
        ),
    ]
}
