//! Decoded state records
//!
//! Every NDC state type has its own field layout. A record is decoded into
//! a [`StateKind`] variant carrying the named entries of that layout, and
//! the outgoing transitions are derived from the variant on demand.

use super::field::{self, FIELD_WIDTH, FIRST_ENTRY, LAST_ENTRY};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type StateNumber = String;

/// Number of the state every transaction flow starts from
pub const ROOT_STATE: &str = "000";

/// Next-state value meaning "no next state"
pub const NO_NEXT_STATE: &str = "000";

/// Extension-state value meaning "no extension"
pub const NO_EXTENSION: &str = "255";

/// FDK letters addressed by an FDK switch state, in table order (no `E`)
pub const FDK_SWITCH_KEYS: [char; 8] = ['A', 'B', 'C', 'D', 'F', 'G', 'H', 'I'];

/// A decoded state table record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord {
    pub number: StateNumber,
    #[serde(flatten)]
    pub kind: StateKind,
}

/// State layouts, one variant per type discriminator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StateKind {
    #[serde(rename = "A")]
    CardRead {
        screen_number: String,
        good_read_next_state: String,
        error_screen_number: String,
        read_condition_1: String,
        read_condition_2: String,
        read_condition_3: String,
        card_return_flag: String,
        no_fit_match_next_state: String,
    },
    #[serde(rename = "B")]
    PinEntry {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        local_pin_check_good_next_state: String,
        local_pin_check_max_bad_pins_next_state: String,
        local_pin_check_error_screen: String,
        remote_pin_check_next_state: String,
        local_pin_check_max_retries: String,
    },
    #[serde(rename = "b")]
    CustomerSelectablePin {
        first_entry_screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        good_read_next_state: String,
        csp_fail_next_state: String,
        second_entry_screen_number: String,
        mismatch_first_entry_screen_number: String,
        extension_state: String,
    },
    #[serde(rename = "C")]
    EnvelopeDispenser { next_state: String },
    #[serde(rename = "D")]
    PresetOperationCode {
        next_state: String,
        clear_mask: String,
        #[serde(rename = "A_preset_mask")]
        a_preset_mask: String,
        #[serde(rename = "B_preset_mask")]
        b_preset_mask: String,
        #[serde(rename = "C_preset_mask")]
        c_preset_mask: String,
        #[serde(rename = "D_preset_mask")]
        d_preset_mask: String,
        extension_state: String,
    },
    #[serde(rename = "E")]
    FourFdkSelection {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        #[serde(rename = "FDK_A_next_state")]
        fdk_a_next_state: String,
        #[serde(rename = "FDK_B_next_state")]
        fdk_b_next_state: String,
        #[serde(rename = "FDK_C_next_state")]
        fdk_c_next_state: String,
        #[serde(rename = "FDK_D_next_state")]
        fdk_d_next_state: String,
        buffer_location: String,
    },
    #[serde(rename = "F")]
    AmountEntry {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        #[serde(rename = "FDK_A_next_state")]
        fdk_a_next_state: String,
        #[serde(rename = "FDK_B_next_state")]
        fdk_b_next_state: String,
        #[serde(rename = "FDK_C_next_state")]
        fdk_c_next_state: String,
        #[serde(rename = "FDK_D_next_state")]
        fdk_d_next_state: String,
        amount_display_screen: String,
    },
    #[serde(rename = "G")]
    AmountCheck {
        amount_check_condition_true: String,
        amount_check_condition_false: String,
        buffer_to_check: String,
        integer_multiple_value: String,
        decimal_places: String,
        currency_type: String,
        amount_check_condition: String,
    },
    #[serde(rename = "H")]
    InformationEntry {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        #[serde(rename = "FDK_A_next_state")]
        fdk_a_next_state: String,
        #[serde(rename = "FDK_B_next_state")]
        fdk_b_next_state: String,
        #[serde(rename = "FDK_C_next_state")]
        fdk_c_next_state: String,
        #[serde(rename = "FDK_D_next_state")]
        fdk_d_next_state: String,
        buffer_and_display_params: String,
    },
    #[serde(rename = "I")]
    TransactionRequest {
        screen_number: String,
        timeout_next_state: String,
        send_track2: String,
        send_track1_track3: String,
        send_operation_code: String,
        send_amount_data: String,
        send_pin_buffer: String,
        #[serde(rename = "send_buffer_B_buffer_C")]
        send_buffer_b_buffer_c: String,
    },
    #[serde(rename = "J")]
    Close {
        receipt_delivered_screen: String,
        next_state: String,
        no_receipt_delivered_screen: String,
        card_retained_screen_number: String,
        statement_delivered_screen_number: String,
        bna_notes_returned_screen: String,
        extension_state: String,
    },
    #[serde(rename = "k")]
    SmartFitCheck {
        good_read_next_state: String,
        card_return_flag: String,
        no_fit_match_next_state: String,
    },
    #[serde(rename = "K")]
    FitSwitch { next_states: [String; 8] },
    #[serde(rename = "m")]
    PinLanguageSelect {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        next_state_options_extension_state: String,
        operation_codes_extension_state: String,
        buffer_positions: String,
        #[serde(rename = "FDK_active_mask")]
        fdk_active_mask: String,
        multi_language_screens_extension_state: String,
    },
    #[serde(rename = "U")]
    DeviceFitnessSelect {
        device_number: String,
        device_available_next_state: String,
        device_identifier_grafic: String,
        device_unavailable_next_state: String,
        device_subcomponent_identifier: String,
    },
    #[serde(rename = "W")]
    FdkSwitch { states: BTreeMap<char, String> },
    #[serde(rename = "X")]
    FdkInformationEntry {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        #[serde(rename = "FDK_next_state")]
        fdk_next_state: String,
        extension_state: String,
        buffer_id: String,
        #[serde(rename = "FDK_active_mask")]
        fdk_active_mask: String,
    },
    #[serde(rename = "Y")]
    EightFdkSelection {
        screen_number: String,
        timeout_next_state: String,
        cancel_next_state: String,
        #[serde(rename = "FDK_next_state")]
        fdk_next_state: String,
        extension_state: String,
        buffer_positions: String,
        #[serde(rename = "FDK_active_mask")]
        fdk_active_mask: String,
        multi_language_screens: String,
    },
    /// Entries are indexed like the NDC table: `entries[1]` is the type,
    /// `entries[2..=9]` the data entries, `entries[0]` is unused.
    #[serde(rename = "Z")]
    Extension { entries: Vec<Option<String>> },
    #[serde(rename = ">")]
    CashDeposit {
        cancel_key_mask: String,
        deposit_key_mask: String,
        add_more_key_mask: String,
        refund_key_mask: String,
        extension_state_1: String,
        extension_state_2: String,
        extension_state_3: String,
    },
    #[serde(rename = "/")]
    CompleteIccSelection {
        please_wait_screen_number: String,
        icc_app_name_template_screen_number: String,
        icc_app_name_screen_number: String,
        extension_state: String,
    },
    #[serde(rename = "?")]
    SetIccTransactionData {
        next_state: String,
        currency_type: String,
        transaction_type: String,
        amount_authorized_source: String,
        amount_other_source: String,
        amount_too_large_next_state: String,
    },
    #[serde(rename = "z")]
    EmvIccAppSwitch {
        next_state: String,
        terminal_aid_extension_1: String,
        next_state_extension_1: String,
        terminal_aid_extension_2: String,
        next_state_extension_2: String,
        terminal_aid_extension_3: String,
        next_state_extension_3: String,
    },
    #[serde(rename = "+")]
    BeginIccInit {
        icc_init_started_next_state: String,
        icc_init_not_started_next_state: String,
        icc_init_requirement: String,
        automatic_icc_app_selection_flag: String,
        default_app_label_usage_flag: String,
        cardholder_confirmation_flag: String,
    },
    #[serde(rename = ",")]
    CompleteIccInit {
        please_wait_screen_number: String,
        icc_init_success: String,
        card_not_smart_next_state: String,
        no_usable_applications_next_state: String,
        icc_app_level_error_next_state: String,
        icc_hardware_level_error_next_state: String,
        no_usable_applications_fallback_next_state: String,
    },
    #[serde(rename = "-")]
    AutoLanguageSelect {
        language_match_next_state: String,
        no_language_match_next_state: String,
    },
    #[serde(rename = ".")]
    BeginIccAppSelection {
        cardholder_selection_screen_number: String,
        #[serde(rename = "FDK_template_screen_numbers_extension_state")]
        fdk_template_screen_numbers_extension_state: String,
        action_keys_extension_state_number: String,
        exit_paths_extension_state_number: String,
        single_app_cardholder_selection_screen_number: String,
    },
    #[serde(rename = ";")]
    IccReinitialize {
        good_read_next_state: String,
        processing_not_performed_next_state: String,
        reinit_method: String,
        chip_power_control: String,
        reset_terminal_pobjects: String,
    },
    #[serde(rename = "&")]
    BarcodeRead {
        screen_number: String,
        good_read_next_state: String,
        cancel_next_state: String,
        error_next_state: String,
        timeout_next_state: String,
    },
}

impl StateKind {
    /// The type discriminator of this layout
    pub fn type_char(&self) -> char {
        match self {
            StateKind::CardRead { .. } => 'A',
            StateKind::PinEntry { .. } => 'B',
            StateKind::CustomerSelectablePin { .. } => 'b',
            StateKind::EnvelopeDispenser { .. } => 'C',
            StateKind::PresetOperationCode { .. } => 'D',
            StateKind::FourFdkSelection { .. } => 'E',
            StateKind::AmountEntry { .. } => 'F',
            StateKind::AmountCheck { .. } => 'G',
            StateKind::InformationEntry { .. } => 'H',
            StateKind::TransactionRequest { .. } => 'I',
            StateKind::Close { .. } => 'J',
            StateKind::SmartFitCheck { .. } => 'k',
            StateKind::FitSwitch { .. } => 'K',
            StateKind::PinLanguageSelect { .. } => 'm',
            StateKind::DeviceFitnessSelect { .. } => 'U',
            StateKind::FdkSwitch { .. } => 'W',
            StateKind::FdkInformationEntry { .. } => 'X',
            StateKind::EightFdkSelection { .. } => 'Y',
            StateKind::Extension { .. } => 'Z',
            StateKind::CashDeposit { .. } => '>',
            StateKind::CompleteIccSelection { .. } => '/',
            StateKind::SetIccTransactionData { .. } => '?',
            StateKind::EmvIccAppSwitch { .. } => 'z',
            StateKind::BeginIccInit { .. } => '+',
            StateKind::CompleteIccInit { .. } => ',',
            StateKind::AutoLanguageSelect { .. } => '-',
            StateKind::BeginIccAppSelection { .. } => '.',
            StateKind::IccReinitialize { .. } => ';',
            StateKind::BarcodeRead { .. } => '&',
        }
    }

    /// Human readable name of the state type
    pub fn description(&self) -> &'static str {
        match self {
            StateKind::CardRead { .. } => "Card read state",
            StateKind::PinEntry { .. } => "PIN Entry state",
            StateKind::CustomerSelectablePin { .. } => "Customer selectable PIN state",
            StateKind::EnvelopeDispenser { .. } => "Envelope Dispenser state",
            StateKind::PresetOperationCode { .. } => "PreSet Operation Code Buffer",
            StateKind::FourFdkSelection { .. } => "Four FDK selection state",
            StateKind::AmountEntry { .. } => "Amount entry state",
            StateKind::AmountCheck { .. } => "Amount check state",
            StateKind::InformationEntry { .. } => "Information Entry State",
            StateKind::TransactionRequest { .. } => "Transaction request state",
            StateKind::Close { .. } => "Close state",
            StateKind::SmartFitCheck { .. } => "Smart FIT check state",
            StateKind::FitSwitch { .. } => "FIT Switch state",
            StateKind::PinLanguageSelect { .. } => "PIN & Language Select State",
            StateKind::DeviceFitnessSelect { .. } => "Device Fitness Flow Select State",
            StateKind::FdkSwitch { .. } => "FDK Switch state",
            StateKind::FdkInformationEntry { .. } => "FDK information entry state",
            StateKind::EightFdkSelection { .. } => "Eight FDK selection state",
            StateKind::Extension { .. } => "Extension state",
            StateKind::CashDeposit { .. } => "Cash deposit state",
            StateKind::CompleteIccSelection { .. } => "Complete ICC selection",
            StateKind::SetIccTransactionData { .. } => "Set ICC transaction data",
            StateKind::EmvIccAppSwitch { .. } => "EMV ICC Application Switch state",
            StateKind::BeginIccInit { .. } => "Begin ICC Initialization state",
            StateKind::CompleteIccInit { .. } => "Complete ICC Initialization state",
            StateKind::AutoLanguageSelect { .. } => "Automatic Language Selection state",
            StateKind::BeginIccAppSelection { .. } => {
                "Begin ICC Application Selection & Initialization state"
            }
            StateKind::IccReinitialize { .. } => "ICC Re-initialize state",
            StateKind::BarcodeRead { .. } => "Barcode Read State",
        }
    }

    /// Outgoing transitions in table order, duplicates kept.
    ///
    /// `None` for layouts without next-state entries, and for a close
    /// state whose next state is [`NO_NEXT_STATE`].
    pub fn states_to(&self) -> Option<Vec<&str>> {
        let targets = match self {
            StateKind::CardRead {
                good_read_next_state,
                no_fit_match_next_state,
                ..
            } => vec![good_read_next_state, no_fit_match_next_state],
            StateKind::PinEntry {
                timeout_next_state,
                cancel_next_state,
                local_pin_check_good_next_state,
                local_pin_check_max_bad_pins_next_state,
                remote_pin_check_next_state,
                ..
            } => vec![
                timeout_next_state,
                cancel_next_state,
                local_pin_check_good_next_state,
                local_pin_check_max_bad_pins_next_state,
                remote_pin_check_next_state,
            ],
            StateKind::CustomerSelectablePin {
                timeout_next_state,
                cancel_next_state,
                good_read_next_state,
                csp_fail_next_state,
                ..
            } => vec![
                timeout_next_state,
                cancel_next_state,
                good_read_next_state,
                csp_fail_next_state,
            ],
            StateKind::EnvelopeDispenser { next_state }
            | StateKind::PresetOperationCode { next_state, .. } => vec![next_state],
            StateKind::FourFdkSelection {
                timeout_next_state,
                cancel_next_state,
                fdk_a_next_state,
                fdk_b_next_state,
                fdk_c_next_state,
                fdk_d_next_state,
                ..
            }
            | StateKind::AmountEntry {
                timeout_next_state,
                cancel_next_state,
                fdk_a_next_state,
                fdk_b_next_state,
                fdk_c_next_state,
                fdk_d_next_state,
                ..
            }
            | StateKind::InformationEntry {
                timeout_next_state,
                cancel_next_state,
                fdk_a_next_state,
                fdk_b_next_state,
                fdk_c_next_state,
                fdk_d_next_state,
                ..
            } => vec![
                timeout_next_state,
                cancel_next_state,
                fdk_a_next_state,
                fdk_b_next_state,
                fdk_c_next_state,
                fdk_d_next_state,
            ],
            StateKind::TransactionRequest {
                timeout_next_state, ..
            } => vec![timeout_next_state],
            StateKind::Close { next_state, .. } => {
                if next_state == NO_NEXT_STATE {
                    return None;
                }
                vec![next_state]
            }
            StateKind::SmartFitCheck {
                good_read_next_state,
                ..
            } => vec![good_read_next_state],
            StateKind::FitSwitch { next_states } => next_states.iter().collect(),
            StateKind::PinLanguageSelect {
                timeout_next_state,
                cancel_next_state,
                ..
            } => vec![timeout_next_state, cancel_next_state],
            StateKind::DeviceFitnessSelect {
                device_available_next_state,
                device_unavailable_next_state,
                ..
            } => vec![device_available_next_state, device_unavailable_next_state],
            StateKind::FdkSwitch { states } => states.values().collect(),
            StateKind::FdkInformationEntry {
                timeout_next_state,
                cancel_next_state,
                fdk_next_state,
                ..
            }
            | StateKind::EightFdkSelection {
                timeout_next_state,
                cancel_next_state,
                fdk_next_state,
                ..
            } => vec![timeout_next_state, cancel_next_state, fdk_next_state],
            StateKind::SetIccTransactionData {
                next_state,
                amount_too_large_next_state,
                ..
            } => vec![next_state, amount_too_large_next_state],
            StateKind::BeginIccInit {
                icc_init_started_next_state,
                icc_init_not_started_next_state,
                ..
            } => vec![icc_init_started_next_state, icc_init_not_started_next_state],
            StateKind::CompleteIccInit {
                icc_init_success,
                card_not_smart_next_state,
                no_usable_applications_next_state,
                icc_app_level_error_next_state,
                icc_hardware_level_error_next_state,
                no_usable_applications_fallback_next_state,
                ..
            } => vec![
                icc_init_success,
                card_not_smart_next_state,
                no_usable_applications_next_state,
                icc_app_level_error_next_state,
                icc_hardware_level_error_next_state,
                no_usable_applications_fallback_next_state,
            ],
            StateKind::AutoLanguageSelect {
                language_match_next_state,
                no_language_match_next_state,
            } => vec![language_match_next_state, no_language_match_next_state],
            StateKind::IccReinitialize {
                good_read_next_state,
                processing_not_performed_next_state,
                ..
            } => vec![good_read_next_state, processing_not_performed_next_state],
            StateKind::BarcodeRead {
                good_read_next_state,
                cancel_next_state,
                error_next_state,
                timeout_next_state,
                ..
            } => vec![
                good_read_next_state,
                cancel_next_state,
                error_next_state,
                timeout_next_state,
            ],
            StateKind::AmountCheck { .. }
            | StateKind::Extension { .. }
            | StateKind::CashDeposit { .. }
            | StateKind::CompleteIccSelection { .. }
            | StateKind::EmvIccAppSwitch { .. }
            | StateKind::BeginIccAppSelection { .. } => return None,
        };

        Some(targets.into_iter().map(String::as_str).collect())
    }

    /// The raw `extension_state` entry, for layouts that have one
    pub fn extension_state(&self) -> Option<&str> {
        match self {
            StateKind::CustomerSelectablePin {
                extension_state, ..
            }
            | StateKind::PresetOperationCode {
                extension_state, ..
            }
            | StateKind::Close {
                extension_state, ..
            }
            | StateKind::FdkInformationEntry {
                extension_state, ..
            }
            | StateKind::EightFdkSelection {
                extension_state, ..
            }
            | StateKind::CompleteIccSelection {
                extension_state, ..
            } => Some(extension_state),
            _ => None,
        }
    }

    /// Entry `index` of an extension state, as numbered in the NDC table
    pub fn entry(&self, index: usize) -> Option<&str> {
        match self {
            StateKind::Extension { entries } => entries.get(index)?.as_deref(),
            _ => None,
        }
    }
}

impl StateRecord {
    pub fn state_type(&self) -> char {
        self.kind.type_char()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn states_to(&self) -> Option<Vec<&str>> {
        self.kind.states_to()
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.kind, StateKind::Extension { .. })
    }

    /// The extension state number, unless absent or one of the "unused" sentinels
    pub fn linked_extension(&self) -> Option<&str> {
        self.kind
            .extension_state()
            .filter(|ext| *ext != NO_NEXT_STATE && *ext != NO_EXTENSION)
    }
}

impl fmt::Display for StateRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.number, self.state_type())
    }
}

impl FromStr for StateRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// Decode a 28-character state record
pub fn decode(record: &str) -> Result<StateRecord> {
    let number = field::extract_number(record);
    if number.len() != FIELD_WIDTH || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidNumber {
            number: number.to_string(),
        });
    }

    let state_type = field::extract_field(record, 1).unwrap_or_default();
    let unsupported = || Error::UnsupportedType {
        number: number.to_string(),
        state_type: state_type.to_string(),
    };
    let mut type_chars = state_type.chars();
    let type_char = match (type_chars.next(), type_chars.next()) {
        (Some(c), None) => c,
        _ => return Err(unsupported()),
    };

    let e = |index: usize| {
        field::extract_field(record, index)
            .unwrap_or_default()
            .to_string()
    };

    let kind = match type_char {
        'A' => StateKind::CardRead {
            screen_number: e(2),
            good_read_next_state: e(3),
            error_screen_number: e(4),
            read_condition_1: e(5),
            read_condition_2: e(6),
            read_condition_3: e(7),
            card_return_flag: e(8),
            no_fit_match_next_state: e(9),
        },
        'B' => StateKind::PinEntry {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            local_pin_check_good_next_state: e(5),
            local_pin_check_max_bad_pins_next_state: e(6),
            local_pin_check_error_screen: e(7),
            remote_pin_check_next_state: e(8),
            local_pin_check_max_retries: e(9),
        },
        'b' => StateKind::CustomerSelectablePin {
            first_entry_screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            good_read_next_state: e(5),
            csp_fail_next_state: e(6),
            second_entry_screen_number: e(7),
            mismatch_first_entry_screen_number: e(8),
            extension_state: e(9),
        },
        'C' => StateKind::EnvelopeDispenser { next_state: e(2) },
        'D' => StateKind::PresetOperationCode {
            next_state: e(2),
            clear_mask: e(3),
            a_preset_mask: e(4),
            b_preset_mask: e(5),
            c_preset_mask: e(6),
            d_preset_mask: e(7),
            extension_state: e(9),
        },
        'E' => StateKind::FourFdkSelection {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            fdk_a_next_state: e(5),
            fdk_b_next_state: e(6),
            fdk_c_next_state: e(7),
            fdk_d_next_state: e(8),
            buffer_location: e(9),
        },
        'F' => StateKind::AmountEntry {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            fdk_a_next_state: e(5),
            fdk_b_next_state: e(6),
            fdk_c_next_state: e(7),
            fdk_d_next_state: e(8),
            amount_display_screen: e(9),
        },
        'G' => StateKind::AmountCheck {
            amount_check_condition_true: e(2),
            amount_check_condition_false: e(3),
            buffer_to_check: e(4),
            integer_multiple_value: e(5),
            decimal_places: e(6),
            currency_type: e(7),
            amount_check_condition: e(8),
        },
        'H' => StateKind::InformationEntry {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            fdk_a_next_state: e(5),
            fdk_b_next_state: e(6),
            fdk_c_next_state: e(7),
            fdk_d_next_state: e(8),
            buffer_and_display_params: e(9),
        },
        'I' => StateKind::TransactionRequest {
            screen_number: e(2),
            timeout_next_state: e(3),
            send_track2: e(4),
            send_track1_track3: e(5),
            send_operation_code: e(6),
            send_amount_data: e(7),
            send_pin_buffer: e(8),
            send_buffer_b_buffer_c: e(9),
        },
        'J' => StateKind::Close {
            receipt_delivered_screen: e(2),
            next_state: e(3),
            no_receipt_delivered_screen: e(4),
            card_retained_screen_number: e(5),
            statement_delivered_screen_number: e(6),
            bna_notes_returned_screen: e(8),
            extension_state: e(9),
        },
        'k' => StateKind::SmartFitCheck {
            good_read_next_state: e(3),
            card_return_flag: e(8),
            no_fit_match_next_state: e(9),
        },
        'K' => StateKind::FitSwitch {
            next_states: std::array::from_fn(|i| e(i + FIRST_ENTRY)),
        },
        'm' => StateKind::PinLanguageSelect {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            next_state_options_extension_state: e(5),
            operation_codes_extension_state: e(6),
            buffer_positions: e(7),
            fdk_active_mask: e(8),
            multi_language_screens_extension_state: e(9),
        },
        'U' => StateKind::DeviceFitnessSelect {
            device_number: e(2),
            device_available_next_state: e(3),
            device_identifier_grafic: e(4),
            device_unavailable_next_state: e(5),
            device_subcomponent_identifier: e(6),
        },
        'W' => StateKind::FdkSwitch {
            states: FDK_SWITCH_KEYS
                .iter()
                .zip(FIRST_ENTRY..=LAST_ENTRY)
                .map(|(key, index)| (*key, e(index)))
                .collect(),
        },
        'X' => StateKind::FdkInformationEntry {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            fdk_next_state: e(5),
            extension_state: e(6),
            buffer_id: e(7),
            fdk_active_mask: e(8),
        },
        'Y' => StateKind::EightFdkSelection {
            screen_number: e(2),
            timeout_next_state: e(3),
            cancel_next_state: e(4),
            fdk_next_state: e(5),
            extension_state: e(6),
            buffer_positions: e(7),
            fdk_active_mask: e(8),
            multi_language_screens: e(9),
        },
        'Z' => {
            let mut entries = vec![None, Some("Z".to_string())];
            entries.extend((FIRST_ENTRY..=LAST_ENTRY).map(|index| Some(e(index))));
            StateKind::Extension { entries }
        }
        '>' => StateKind::CashDeposit {
            cancel_key_mask: e(2),
            deposit_key_mask: e(3),
            add_more_key_mask: e(4),
            refund_key_mask: e(5),
            extension_state_1: e(6),
            extension_state_2: e(7),
            extension_state_3: e(8),
        },
        '/' => StateKind::CompleteIccSelection {
            please_wait_screen_number: e(2),
            icc_app_name_template_screen_number: e(3),
            icc_app_name_screen_number: e(4),
            extension_state: e(5),
        },
        '?' => StateKind::SetIccTransactionData {
            next_state: e(2),
            currency_type: e(3),
            transaction_type: e(4),
            amount_authorized_source: e(5),
            amount_other_source: e(6),
            amount_too_large_next_state: e(7),
        },
        'z' => StateKind::EmvIccAppSwitch {
            next_state: e(2),
            terminal_aid_extension_1: e(3),
            next_state_extension_1: e(4),
            terminal_aid_extension_2: e(5),
            next_state_extension_2: e(6),
            terminal_aid_extension_3: e(7),
            next_state_extension_3: e(8),
        },
        '+' => StateKind::BeginIccInit {
            icc_init_started_next_state: e(2),
            icc_init_not_started_next_state: e(3),
            icc_init_requirement: e(4),
            automatic_icc_app_selection_flag: e(5),
            default_app_label_usage_flag: e(6),
            cardholder_confirmation_flag: e(7),
        },
        ',' => StateKind::CompleteIccInit {
            please_wait_screen_number: e(2),
            icc_init_success: e(3),
            card_not_smart_next_state: e(4),
            no_usable_applications_next_state: e(5),
            icc_app_level_error_next_state: e(6),
            icc_hardware_level_error_next_state: e(7),
            no_usable_applications_fallback_next_state: e(8),
        },
        '-' => StateKind::AutoLanguageSelect {
            language_match_next_state: e(2),
            no_language_match_next_state: e(3),
        },
        '.' => StateKind::BeginIccAppSelection {
            cardholder_selection_screen_number: e(2),
            fdk_template_screen_numbers_extension_state: e(3),
            action_keys_extension_state_number: e(4),
            exit_paths_extension_state_number: e(5),
            single_app_cardholder_selection_screen_number: e(6),
        },
        ';' => StateKind::IccReinitialize {
            good_read_next_state: e(2),
            processing_not_performed_next_state: e(3),
            reinit_method: e(4),
            chip_power_control: e(5),
            reset_terminal_pobjects: e(6),
        },
        '&' => StateKind::BarcodeRead {
            screen_number: e(2),
            good_read_next_state: e(3),
            cancel_next_state: e(4),
            error_next_state: e(5),
            timeout_next_state: e(6),
        },
        _ => return Err(unsupported()),
    };

    Ok(StateRecord {
        number: number.to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_card_read() {
        let record = decode("000A870500128002002002001127").unwrap();
        assert_eq!(record.number, "000");
        assert_eq!(record.state_type(), 'A');
        assert_eq!(record.description(), "Card read state");
        assert_eq!(record.states_to(), Some(vec!["500", "127"]));
        assert_eq!(record.to_string(), "000 A");
    }

    #[test]
    fn test_invalid_number() {
        let err = decode("XYZA870500128002002002001127").unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { ref number } if number == "XYZ"));
        assert!(matches!(decode(""), Err(Error::InvalidNumber { .. })));
        assert!(matches!(decode("12"), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn test_unsupported_type_keeps_number() {
        let err = decode("042Q870500128002002002001127").unwrap_err();
        match err {
            Error::UnsupportedType { number, state_type } => {
                assert_eq!(number, "042");
                assert_eq!(state_type, "Q");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(decode("042"), Err(Error::UnsupportedType { .. })));
        assert!(matches!(decode("0421"), Err(Error::UnsupportedType { .. })));
    }

    #[test]
    fn test_close_without_next_state_has_no_links() {
        let record = decode("002J132000132136132000081178").unwrap();
        assert_eq!(record.states_to(), None);
        assert_eq!(record.linked_extension(), Some("178"));
    }

    #[test]
    fn test_linked_extension_skips_sentinels() {
        let unused = decode("011Y023002131012255004052013").unwrap();
        assert_eq!(unused.kind.extension_state(), Some("255"));
        assert_eq!(unused.linked_extension(), None);

        let zero = decode("003D024000128000000000000000").unwrap();
        assert_eq!(zero.linked_extension(), None);

        let card = decode("000A870500128002002002001127").unwrap();
        assert_eq!(card.kind.extension_state(), None);
    }

    #[test]
    fn test_extension_entries() {
        let record = decode("037Z1234567890ABCDEFGHIJKLMN").unwrap();
        assert!(record.is_extension());
        assert_eq!(record.kind.entry(0), None);
        assert_eq!(record.kind.entry(1), Some("Z"));
        assert_eq!(record.kind.entry(4), Some("789"));
        assert_eq!(record.kind.entry(9), Some("LMN"));
        assert_eq!(record.kind.entry(10), None);
        assert_eq!(record.states_to(), None);
    }

    #[test]
    fn test_from_str() {
        let record: StateRecord = "634C631791092174618362840503".parse().unwrap();
        assert_eq!(record.states_to(), Some(vec!["631"]));
    }

    #[test]
    fn test_serde_roundtrip_keeps_type_tag() {
        let record = decode("035W181037255127031034250186").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "W");
        assert_eq!(json["number"], "035");
        assert_eq!(json["states"]["F"], "031");

        let back: StateRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
