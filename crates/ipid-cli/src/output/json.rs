use ipid_core::error::IpidError;
use ipid_core::model::Ipid;

pub fn print(doc: &Ipid) -> Result<(), IpidError> {
    let json = serde_json::to_string_pretty(doc)?;
    println!("{json}");
    Ok(())
}
