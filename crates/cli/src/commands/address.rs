//! Delivery address commands.

use grubline_core::AddressDraft;
use grubline_storefront::error::AppError;
use grubline_storefront::i18n::keys;
use grubline_storefront::state::AppState;

fn draft(main_address: &str, detail: &str, coordinates: Option<(f64, f64)>) -> AddressDraft {
    let draft = AddressDraft::new(main_address, detail);
    match coordinates {
        Some((lat, lng)) => draft.with_coordinates(lat, lng),
        None => draft,
    }
}

pub fn show(state: &AppState) {
    match state.address().address() {
        Some(address) if state.address().is_address_set() => {
            println!("{}", address.one_line());
            if let (Some(lat), Some(lng)) = (address.lat, address.lng) {
                println!("({lat:.5}, {lng:.5})");
            }
            if let Some(id) = address.address_id {
                println!("saved as #{id}");
            }
        }
        _ => println!("{}", state.message(keys::ADDRESS_REQUIRED)),
    }
}

pub fn set(
    state: &mut AppState,
    main_address: &str,
    detail: &str,
    coordinates: Option<(f64, f64)>,
) -> Result<(), AppError> {
    let address = state
        .address_mut()
        .save_validated(&draft(main_address, detail, coordinates))?;
    println!("{}: {}", state.message(keys::ADDRESS_SAVED), address.one_line());
    Ok(())
}

pub async fn create(
    state: &mut AppState,
    main_address: &str,
    detail: &str,
    coordinates: Option<(f64, f64)>,
) -> Result<(), AppError> {
    let address = state
        .save_address(&draft(main_address, detail, coordinates))
        .await?;
    println!("{}: {}", state.message(keys::ADDRESS_SAVED), address.one_line());
    Ok(())
}

pub async fn list(state: &AppState) -> Result<(), AppError> {
    let addresses = state.catalog().try_delivery_addresses().await?;
    if addresses.is_empty() {
        println!("No saved addresses.");
    }
    for address in addresses {
        let detail = if address.detail_address.is_empty() {
            String::new()
        } else {
            format!(", {}", address.detail_address)
        };
        println!("{:>6}  {}{detail}", address.id.as_i64(), address.main_address);
    }
    Ok(())
}

pub fn clear(state: &mut AppState) {
    state.address_mut().clear_address();
    println!("{}", state.message(keys::ADDRESS_REQUIRED));
}
