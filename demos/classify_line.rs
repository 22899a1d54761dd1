use anyhow::{anyhow, Result};
use nginx_log_parser::{parse_log_date, Classifier, DateExtractor, FilterSpec, UserSignal};

fn main() -> Result<()> {
    let s = r#"93.180.71.3 - - [17/May/2015:08:05:32 +0000] "GET /assets/product_1.png HTTP/1.1" 200 0 "-" "Mozilla/5.0 (X11; Linux x86_64)""#;
    let (ip, tail) = s.split_once(' ').ok_or(anyhow!("invalid log format"))?;

    let extractor = DateExtractor::new()?;
    let raw = extractor.extract(tail).ok_or(anyhow!("no timestamp"))?;
    let date = parse_log_date(raw)?;
    println!("{} -> {:?}", raw, date.datetime());

    for signal in [UserSignal::AssetsPath, UserSignal::Status200] {
        let record = Classifier::new(signal).classify(ip, tail, date.clone());
        println!("{:?}: {:?}", signal, record.map(|r| r.to_string()));
    }

    let filter = FilterSpec::parse_month("05/2015")?;
    println!(
        "bucket for {}: {:?}",
        filter,
        filter.bucket_for(&date, Default::default())
    );
    Ok(())
}
