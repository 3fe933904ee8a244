use gsi_maps::{Colormap, Fixture, MAX_ZOOM, MIN_ZOOM};

pub fn is_numeric_min(min: usize) -> impl Fn(String) -> Result<(), String> {
    move |v: String| {
        let val = v
            .parse::<usize>()
            .map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        }

        Ok(())
    }
}

pub fn is_zoom(v: String) -> Result<(), String> {
    let val = v.parse::<u8>().map_err(|_| "must be numeric".to_owned())?;

    if val < MIN_ZOOM || val > MAX_ZOOM {
        return Err(format!("must be between {} and {}", MIN_ZOOM, MAX_ZOOM));
    }

    Ok(())
}

pub fn is_longitude(v: String) -> Result<(), String> {
    is_in_range(v, 180f64)
}

pub fn is_latitude(v: String) -> Result<(), String> {
    is_in_range(v, 90f64)
}

fn is_in_range(v: String, limit: f64) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val < -limit {
        return Err(format!("must be >= -{}°", limit));
    } else if val > limit {
        return Err(format!("must be <= {}°", limit));
    }

    Ok(())
}

pub fn is_number(v: String) -> Result<(), String> {
    v.parse::<f64>()
        .map_err(|_| "must be numeric".to_owned())
        .and_then(|val| {
            if val.is_finite() {
                Ok(())
            } else {
                Err("must be finite".to_owned())
            }
        })
}

pub fn is_positive_number(v: String) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if val > 0f64 && val.is_finite() {
        Ok(())
    } else {
        Err("must be > 0".to_owned())
    }
}

pub fn is_bb_fixture(v: String) -> Result<(), String> {
    v.parse::<Fixture>()
        .map(|_| ())
        .map_err(|_| "invalid fixture".to_owned())
}

pub fn is_colormap(v: String) -> Result<(), String> {
    v.parse::<Colormap>()
        .map(|_| ())
        .map_err(|e| e.to_string())
}
