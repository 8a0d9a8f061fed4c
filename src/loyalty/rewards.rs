use crate::models::Reward;

/// Rewards members can spend points on.
pub const CATALOG: [Reward; 5] = [
    Reward {
        id: 1,
        name: "Réduction 10%",
        cost: 500,
        description: "10% de réduction sur votre prochain achat",
    },
    Reward {
        id: 2,
        name: "Livraison gratuite",
        cost: 300,
        description: "Livraison offerte sur votre prochaine commande",
    },
    Reward {
        id: 3,
        name: "Produit gratuit",
        cost: 1000,
        description: "Un produit offert parmi une sélection",
    },
    Reward {
        id: 4,
        name: "Cadeau anniversaire",
        cost: 750,
        description: "Un cadeau spécial pour votre anniversaire",
    },
    Reward {
        id: 5,
        name: "Code promo VIP",
        cost: 2000,
        description: "Accès à des offres exclusives pendant 1 mois",
    },
];

pub fn find(catalog: &[Reward], id: u32) -> Option<&Reward> {
    catalog.iter().find(|reward| reward.id == id)
}

/// Cheapest reward; bounds how many redemptions a balance can afford.
pub fn cheapest_cost(catalog: &[Reward]) -> Option<u64> {
    catalog.iter().map(|reward| reward.cost).min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_costs_are_positive_and_ids_unique() {
        let mut ids: Vec<u32> = CATALOG.iter().map(|reward| reward.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), CATALOG.len());
        assert!(CATALOG.iter().all(|reward| reward.cost > 0));
        assert_eq!(cheapest_cost(&CATALOG), Some(300));
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find(&CATALOG, 5).map(|reward| reward.cost), Some(2000));
        assert!(find(&CATALOG, 42).is_none());
    }
}
