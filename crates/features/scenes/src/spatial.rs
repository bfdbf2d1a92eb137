use plaza_domain::scene::Parcel;

/// Parcels within `radius` (Chebyshev) of `center`, row by row.
#[must_use]
pub fn parcels_in_range(center: Parcel, radius: u32) -> Vec<Parcel> {
    let radius = i32::try_from(radius).unwrap_or(i32::MAX / 2);
    let mut parcels = Vec::new();
    for y in center.y.saturating_sub(radius)..=center.y.saturating_add(radius) {
        for x in center.x.saturating_sub(radius)..=center.x.saturating_add(radius) {
            parcels.push(Parcel::new(x, y));
        }
    }
    parcels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_is_the_center() {
        assert_eq!(parcels_in_range(Parcel::new(3, -2), 0), vec![Parcel::new(3, -2)]);
    }

    #[test]
    fn square_of_side_two_radius_plus_one() {
        let center = Parcel::new(-1, 4);
        let parcels = parcels_in_range(center, 2);
        assert_eq!(parcels.len(), 25);
        assert!(parcels.iter().all(|p| p.distance(center) <= 2));
    }
}
